//! CATS profile.

use super::{
    generic_layout, Dialect, Field, FieldSpec, IoEncoding, IoSlot, ModelProfile, PresenceSource,
};
use crate::command::{Command, Memory, Simple, Trajectory, TrajectoryArgs};
use cats_common::robot::consts::PUCK_DETECT_TOOL;
use cats_common::robot::model::Model;

pub(crate) static PROFILE: ModelProfile = ModelProfile {
    model: Model::Cats,
    state: STATE,
    digital_inputs: DIGITAL_INPUTS,
    digital_outputs: DIGITAL_OUTPUTS,
    io_encoding: IoEncoding::Dense,
    position: POSITION,
    polls_message: true,
    polls_secondary_inputs: false,
    aliases: &[],
    presence: PresenceSource::Signals {
        prefix: "di_Cassette",
        suffix: "Presence",
    },
    default_puck_types: "111111111",
    max_puck_lid: 4,
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
        "LidSampleOnDiff",
        "NumSampleOnDiff",
    ],
    dialect: &Cats,
};

/// `state` reply layout, shared with ISARA.
pub(crate) const STATE: &[FieldSpec] = &[
    FieldSpec::flag("Powered"),
    FieldSpec::flag("AutoMode"),
    FieldSpec::flag("DefaultStatus"),
    FieldSpec::text("Tool"),
    FieldSpec::text("Path"),
    FieldSpec::int("LidSampleOnTool"),
    FieldSpec::int("NumSampleOnTool"),
    FieldSpec::int("LidSampleOnDiff"),
    FieldSpec::int("NumSampleOnDiff"),
    FieldSpec::int("NumPlateOnTool"),
    FieldSpec::int("Well"),
    FieldSpec::text("Barcode"),
    FieldSpec::flag("PathRunning"),
    FieldSpec::flag("LN2Regulating"),
    FieldSpec::flag("LN2Warming"),
    FieldSpec::float("SpeedRatio"),
    FieldSpec::int("PuckDetectionDewar1"),
    FieldSpec::int("PuckDetectionDewar2"),
    FieldSpec::int("PositionNumberDewar1"),
    FieldSpec::int("PositionNumberDewar2"),
    FieldSpec::int("LidSampleOnTool2"),
    FieldSpec::int("NumSampleOnTool2"),
    FieldSpec::int("CurrentNumberOfSoaking"),
    FieldSpec::int("PuckTypeLid1"),
    FieldSpec::int("PuckTypeLid2"),
    FieldSpec::int("PuckTypeLid3"),
];

const POSITION: &[FieldSpec] = &[
    FieldSpec::float("Xpos"),
    FieldSpec::float("Ypos"),
    FieldSpec::float("Zpos"),
    FieldSpec::float("RXpos"),
    FieldSpec::float("RYpos"),
    FieldSpec::float("RZpos"),
];

#[derive(Debug)]
pub(crate) struct Cats;

/// Commands CATS and ISARA share outside of trajectories.
pub(super) fn classic_supports(command: &Command) -> bool {
    match command {
        Command::Simple(simple) => !matches!(
            simple,
            Simple::PhaseSeparatorRegulationOn
                | Simple::PhaseSeparatorRegulationOff
                | Simple::DewarCoolingRegulationOn
                | Simple::DewarCoolingRegulationOff
        ),
        Command::Setter(..) => false,
        Command::Lid { .. }
        | Command::DewarRegulation { .. }
        | Command::InitDewar(_)
        | Command::VirtualInput { .. }
        | Command::Backup(_)
        | Command::Restore(_)
        | Command::Memory(..)
        | Command::Trajectory(..) => true,
    }
}

/// Tools 2, 3 and 5; home and safe also accept 0.
pub(super) fn classic_tool_allowed(trajectory: Trajectory, tool: i64) -> bool {
    match trajectory {
        Trajectory::Home | Trajectory::Safe => matches!(tool, 0 | 2 | 3 | 5),
        _ => matches!(tool, 2 | 3 | 5),
    }
}

impl Dialect for Cats {
    fn supports(&self, command: &Command) -> bool {
        match command {
            Command::Memory(Memory::SetTool2, _) => false,
            Command::Trajectory(trajectory, _) => !matches!(
                trajectory,
                Trajectory::Pick
                    | Trajectory::GetBarcode
                    | Trajectory::BackHot
                    | Trajectory::ChangeTool
                    | Trajectory::PlateToDif
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
            // The reader takes its target from the "new" slots.
            Trajectory::Barcode => {
                layout[3] = args.puck_lid.to_string();
                layout[4] = args.sample.to_string();
                layout[1] = "0".to_string();
                layout[2] = "0".to_string();
            }
            Trajectory::PuckDetect => layout[0] = PUCK_DETECT_TOOL.to_string(),
            _ => {}
        }
        layout
    }
}

/// Positions of the `di` reply characters.
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
    IoSlot::new(9, "di_PRI_API"),
    IoSlot::new(10, "di_PRI_APL"),
    IoSlot::new(11, "di_PRI_SOM"),
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

/// Positions of the `do` reply characters.
///
/// Shared with ISARA.
pub(crate) const DIGITAL_OUTPUTS: &[IoSlot] = &[
    IoSlot::new(0, "do_ToolChanger"),
    IoSlot::new(1, "do_ToolOpenClose"),
    IoSlot::new(2, "do_FastOutput"),
    IoSlot::new(4, "do_PRO1_MON"),
    IoSlot::new(5, "do_PRO2_COL"),
    IoSlot::new(6, "do_PRO3_LNW"),
    IoSlot::new(7, "do_PRO4_LNA"),
    IoSlot::new(8, "do_GreenLight"),
    IoSlot::new(9, "do_PilzRelayReset"),
    IoSlot::new(10, "do_ServoCardOn"),
    IoSlot::new(11, "do_ServoCardRotation"),
    IoSlot::new(12, "do_CryoValveLN2C"),
    IoSlot::new(13, "do_CryoValveLN2E"),
    IoSlot::new(14, "do_CryoValveGN2E"),
    IoSlot::new(15, "do_HeaterOnOff"),
    IoSlot::new(16, "do_OpenCloseLid11"),
    IoSlot::new(17, "do_OpenCloseLid12"),
    IoSlot::new(18, "do_OpenCloseLid21"),
    IoSlot::new(19, "do_OpenCloseLid22"),
    IoSlot::new(20, "do_OpenCloseLid31"),
    IoSlot::new(21, "do_OpenCloseLid32"),
    IoSlot::new(25, "do_RequestDew1PosBit1"),
    IoSlot::new(26, "do_RequestDew1PosBit2"),
    IoSlot::new(27, "do_RequestDew1PosBit3"),
    IoSlot::new(28, "do_RequestDew1PosBit4"),
    IoSlot::new(32, "do_OpenLid"),
    IoSlot::new(33, "do_CloseLid"),
    IoSlot::new(34, "do_OpenNewLid"),
    IoSlot::new(35, "do_CloseNewLid"),
    IoSlot::new(36, "do_BarcodeReader"),
    IoSlot::new(37, "do_CloseAllLids"),
    IoSlot::new(47, "do_PRO5_IDL"),
    IoSlot::new(48, "do_PRO6_RAH"),
    IoSlot::new(49, "do_PRO7_RI1"),
    IoSlot::new(50, "do_PRO8_RI2"),
    IoSlot::new(51, "do_PRO9_LIO"),
    IoSlot::new(52, "do_PRO10"),
    IoSlot::new(53, "do_PRO11"),
    IoSlot::new(54, "do_PRO12"),
    IoSlot::new(59, "do_RequestDew2PosBit1"),
    IoSlot::new(60, "do_RequestDew2PosBit2"),
    IoSlot::new(61, "do_RequestDew2PosBit3"),
    IoSlot::new(62, "do_RequestDew2PosBit4"),
    IoSlot::new(65, "do_CryoValveLN2CDew2"),
    IoSlot::new(66, "do_CryoValveLN2EDew2"),
    IoSlot::new(67, "do_CryoVavleGN2EDew2"),
    IoSlot::new(69, "do_OpenCloseLid31Dew2"),
    IoSlot::new(70, "do_OpenCloseLid32Dew2"),
    IoSlot::new(71, "do_OpenCloseLid41Dew2"),
    IoSlot::new(72, "do_OpenCloseLid42Dew2"),
    IoSlot::new(73, "do_PRO13"),
    IoSlot::new(74, "do_PRO14"),
    IoSlot::new(75, "do_PRO15"),
    IoSlot::new(76, "do_PRO16"),
    IoSlot::new(96, "do_RotationDewNewPosWorking"),
    IoSlot::new(97, "do_RotationDewarPosCassLoading"),
    IoSlot::new(98, "do_RotationDewPosWorking"),
];