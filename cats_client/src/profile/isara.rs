//! ISARA profile.
//!
//! Shares the CATS `state` layout and output map. Samples are addressed by
//! puck, and puck presence comes from the `di2` reply.

use super::cats::{classic_supports, classic_tool_allowed, DIGITAL_OUTPUTS, STATE};
use super::{generic_layout, Dialect, IoEncoding, IoSlot, ModelProfile, PresenceSource};
use crate::command::{Command, Trajectory, TrajectoryArgs};
use cats_common::robot::model::Model;

pub(crate) static PROFILE: ModelProfile = ModelProfile {
    model: Model::Isara,
    state: STATE,
    digital_inputs: DIGITAL_INPUTS,
    digital_outputs: DIGITAL_OUTPUTS,
    io_encoding: IoEncoding::Dense,
    position: &[],
    polls_message: false,
    polls_secondary_inputs: true,
    aliases: &[
        ("LidSampleOnTool", "PuckNumberOnTool"),
        ("LidSampleOnDiff", "PuckSampleOnDiff"),
        ("LidSampleOnTool2", "PuckNumberOnTool2"),
    ],
    presence: PresenceSource::SecondaryInputs,
    default_puck_types: "11111111111111111111111111111",
    max_puck_lid: 29,
    signals: [
        "Powered",
        "Path",
        "PathRunning",
        "Tool",
        "di_PRI_SOM",
        "do_PRO5_IDL",
        "do_PRO6_RAH",
        "do_PRO7_RI1",
        "do_PRO8_RI2",
        "PuckSampleOnDiff",
        "NumSampleOnDiff",
    ],
    dialect: &Isara,
};

#[derive(Debug)]
pub(crate) struct Isara;

impl Dialect for Isara {
    fn supports(&self, command: &Command) -> bool {
        match command {
            Command::Trajectory(trajectory, _) => !matches!(
                trajectory,
                Trajectory::Transfer
                    | Trajectory::ReadPosition
                    | Trajectory::ReadLoad
                    | Trajectory::PuckDetect
                    | Trajectory::GotoWell
                    | Trajectory::Adjust
                    | Trajectory::Focus
                    | Trajectory::Expose
                    | Trajectory::Collect
                    | Trajectory::SetPlateAngle
                    | Trajectory::ChangeTool
                    | Trajectory::PlateToDif
                    | Trajectory::GetBarcode
                    | Trajectory::BackHot
                    | Trajectory::DryHome
                    | Trajectory::GetPutPick
                    | Trajectory::CapOnLid
                    | Trajectory::CapOffLid
            ),
            other => classic_supports(other),
        }
    }

    fn tool_allowed(&self, trajectory: Trajectory, tool: i64) -> bool {
        classic_tool_allowed(trajectory, tool)
    }

    fn layout(&self, trajectory: Trajectory, args: &TrajectoryArgs) -> Vec<String> {
        let mut layout = generic_layout(args);
        match trajectory {
            Trajectory::Put
            | Trajectory::PutBarcode
            | Trajectory::Get
            | Trajectory::GetPut
            | Trajectory::GetPutBarcode => layout[9] = "0".to_string(),
            Trajectory::Barcode | Trajectory::GotoDif | Trajectory::Pick => {
                keep_only(&mut layout, &[0, 1, 2, 7])
            }
            Trajectory::Back | Trajectory::Soak | Trajectory::Dry | Trajectory::GetPlate => {
                keep_only(&mut layout, &[0])
            }
            Trajectory::PutPlate | Trajectory::GetPutPlate => keep_only(&mut layout, &[0, 5]),
            _ => {}
        }
        layout
    }
}

/// Zero every argument outside `kept`.
fn keep_only(layout: &mut [String], kept: &[usize]) {
    for (i, arg) in layout.iter_mut().enumerate() {
        if !kept.contains(&i) {
            *arg = "0".to_string();
        }
    }
}

/// Positions of the `di` reply characters.
///
/// Same map as CATS except slots 9..11, which carry the plate mode and
/// sample-on-magnet sensors.
pub(crate) const DIGITAL_INPUTS: &[IoSlot] = &[
    IoSlot::new(0, "di_CryoOK"),
    IoSlot::new(1, "di_EStopAirpresOK"),
    IoSlot::new(2, "di_CollisonSensorOK"),
    IoSlot::new(3, "di_CryoHighLevelAlarm"),
    IoSlot::new(4, "di_CryoHighLevel"),
    IoSlot::new(5, "di_CryoLowLevel"),
    IoSlot::new(6, "di_CryoLowLevelAlarm"),
    IoSlot::new(7, "di_CryoLiquidDetection"),
    IoSlot::new(8, "di_PRI_GFM"),
    IoSlot::new(9, "di_DiffPlateMode"),
    IoSlot::new(10, "di_PRI_SOM"),
    IoSlot::new(11, "di_PlateOnDiff"),
    IoSlot::new(12, "di_Cassette1Presence"),
    IoSlot::new(13, "di_Cassette2Presence"),
    IoSlot::new(14, "di_Cassette3Presence"),
    IoSlot::new(15, "di_Cassette4Presence"),
    IoSlot::new(16, "di_Cassette5Presence"),
    IoSlot::new(17, "di_Cassette6Presence"),
    IoSlot::new(18, "di_Cassette7Presence"),
    IoSlot::new(19, "di_Cassette8Presence"),
    IoSlot::new(20, "di_Cassette9Presence"),
    IoSlot::new(21, "di_Lid1Open"),
    IoSlot::new(22, "di_Lid2Open"),
    IoSlot::new(23, "di_Lid3Open"),
    IoSlot::new(24, "di_ToolOpen"),
    IoSlot::new(25, "di_ToolClosed"),
    IoSlot::new(26, "di_LimSW1RotGripAxis"),
    IoSlot::new(27, "di_LimSW2RotGripAxis"),
    IoSlot::new(28, "di_ModbusPLCLifeBit"),
    IoSlot::new(31, "di_LifeBitFromPLC"),
    IoSlot::new(32, "di_ActiveLidOpened"),
    IoSlot::new(33, "di_NewActiveLidOpened"),
    IoSlot::new(34, "di_ToolChangerOpened"),
    IoSlot::new(35, "di_ActiveCassettePresence"),
    IoSlot::new(36, "di_NewActiveCassettePresence"),
    IoSlot::new(37, "di_AllLidsClosed"),
    IoSlot::new(47, "di_PRI5"),
    IoSlot::new(48, "di_PRI6"),
    IoSlot::new(49, "di_PRI7"),
    IoSlot::new(50, "di_PRI8"),
    IoSlot::new(51, "di_PRI9"),
    IoSlot::new(52, "di_PRI10"),
    IoSlot::new(53, "di_PRI11"),
    IoSlot::new(54, "di_PRI12"),
    IoSlot::new(89, "di_VI90"),
    IoSlot::new(90, "di_VI91"),
    IoSlot::new(91, "di_VI92"),
    IoSlot::new(92, "di_VI93"),
    IoSlot::new(93, "di_VI94"),
    IoSlot::new(94, "di_VI95"),
    IoSlot::new(95, "di_VI96"),
    IoSlot::new(96, "di_VI97"),
    IoSlot::new(97, "di_VI98"),
    IoSlot::new(98, "di_VI99"),
];