//! ISARA2 profile.
//!
//! The `state` reply carries positions, joint angles and the controller
//! message itself, so only `state`, `di` and `do` are polled. Digital I/O
//! arrives as comma-separated integers.

use super::{Dialect, FieldSpec, IoEncoding, IoSlot, ModelProfile, PresenceSource};
use crate::command::{Command, Memory, Simple, Trajectory, TrajectoryArgs};
use cats_common::robot::model::Model;

pub(crate) static PROFILE: ModelProfile = ModelProfile {
    model: Model::Isara2,
    state: STATE,
    digital_inputs: DIGITAL_INPUTS,
    digital_outputs: DIGITAL_OUTPUTS,
    io_encoding: IoEncoding::Csv,
    position: &[],
    polls_message: false,
    polls_secondary_inputs: false,
    aliases: &[
        ("NumPuckOnTool", "PuckNumberOnTool"),
        ("NumPuckOnDiff", "PuckSampleOnDiff"),
        ("NumPuckOnTool2", "PuckNumberOnTool2"),
    ],
    presence: PresenceSource::Signals {
        prefix: "do_Puck",
        suffix: "Presence",
    },
    default_puck_types: "22222222222222222222222222222",
    max_puck_lid: 29,
    signals: [
        "Powered",
        "Path",
        "PathRunning",
        "Tool",
        "do_PRI4_SOM",
        "do_PRO2_IDL",
        "do_PRO3_RAH",
        "do_PRO4_RI1",
        "do_PRO5_RI2",
        "NumPuckOnDiff",
        "NumSampleOnDiff",
    ],
    dialect: &Isara2,
};

const STATE: &[FieldSpec] = &[
    FieldSpec::flag("Powered"),
    FieldSpec::flag("RemoteMode"),
    FieldSpec::flag("FaultStatus"),
    FieldSpec::text("Tool"),
    FieldSpec::text("Position"),
    FieldSpec::text("Path"),
    FieldSpec::flag("GripperJawAOpened"),
    FieldSpec::flag("GripperJawBOpened"),
    FieldSpec::int("NumPuckOnTool"),
    FieldSpec::int("NumSampleOnTool"),
    FieldSpec::int("NumPuckOnTool2"),
    FieldSpec::int("NumSampleOnTool2"),
    FieldSpec::int("NumPuckOnDiff"),
    FieldSpec::int("NumSampleOnDiff"),
    FieldSpec::int("NumPlateOnTool"),
    FieldSpec::int("NumPlateOnDiff"),
    FieldSpec::text("Barcode"),
    FieldSpec::flag("PathRunning"),
    FieldSpec::flag("PathPaused"),
    FieldSpec::float("SpeedRatio"),
    FieldSpec::flag("LN2Regulating"),
    FieldSpec::int("CurrentNumberOfSoaking"),
    FieldSpec::float("LN2DewarLevel"),
    FieldSpec::float("LN2MaxLevelSetpoint"),
    FieldSpec::float("LN2MinLevelSetpoint"),
    FieldSpec::flag("CameraAutoTrackEnabled"),
    FieldSpec::flag("GripperDrying"),
    FieldSpec::flag("PhaseSepLN2Regulating"),
    FieldSpec::free_text("Message"),
    FieldSpec::int("AlarmsWord"),
    FieldSpec::float("Xpos"),
    FieldSpec::float("Ypos"),
    FieldSpec::float("Zpos"),
    FieldSpec::float("RXpos"),
    FieldSpec::float("RYpos"),
    FieldSpec::float("RZpos"),
    FieldSpec::float("JointAxis1pos"),
    FieldSpec::float("JointAxis2pos"),
    FieldSpec::float("JointAxis3pos"),
    FieldSpec::float("JointAxis4pos"),
    FieldSpec::float("JointAxis5pos"),
    FieldSpec::float("JointAxis6pos"),
    FieldSpec::text("RobotControllerMessage"),
    FieldSpec::text("CryoVisionMessage"),
    FieldSpec::text("CryoVisionFeedbackData"),
    FieldSpec::text("IsExternalLightOff"),
    FieldSpec::text("IsHeatingCableOn"),
    FieldSpec::float("DewarHighTemperature"),
    FieldSpec::float("DewarLowTemperature"),
    FieldSpec::float("PhaseSepLevelTemperature"),
    FieldSpec::float("PhaseSepAlarmTemperature"),
    FieldSpec::int("LastTeachResult"),
];

#[derive(Debug)]
pub(crate) struct Isara2;

impl Dialect for Isara2 {
    fn supports(&self, command: &Command) -> bool {
        match command {
            Command::Simple(simple) => matches!(
                simple,
                Simple::PowerOn
                    | Simple::PowerOff
                    | Simple::Panic
                    | Simple::Abort
                    | Simple::Pause
                    | Simple::Reset
                    | Simple::Restart
                    | Simple::SpeedUp
                    | Simple::SpeedDown
                    | Simple::OpenTool
                    | Simple::CloseTool
                    | Simple::OpenTool2
                    | Simple::CloseTool2
                    | Simple::MagnetOn
                    | Simple::MagnetOff
                    | Simple::OpenLid
                    | Simple::CloseLid
                    | Simple::RegulationOn
                    | Simple::RegulationOff
                    | Simple::PhaseSeparatorRegulationOn
                    | Simple::PhaseSeparatorRegulationOff
                    | Simple::DewarCoolingRegulationOn
                    | Simple::DewarCoolingRegulationOff
                    | Simple::HeaterOn
                    | Simple::HeaterOff
                    | Simple::ClearBarcode
                    | Simple::ClearMemory
            ),
            Command::Setter(..) => true,
            Command::Memory(memory, _) => matches!(memory, Memory::SetOnDiff | Memory::SetTool),
            Command::Trajectory(trajectory, _) => matches!(
                trajectory,
                Trajectory::Home
                    | Trajectory::Recover
                    | Trajectory::Back
                    | Trajectory::BackHot
                    | Trajectory::Soak
                    | Trajectory::Dry
                    | Trajectory::ChangeTool
                    | Trajectory::ToolCalibration
                    | Trajectory::Barcode
                    | Trajectory::Put
                    | Trajectory::PutBarcode
                    | Trajectory::PutHot
                    | Trajectory::Get
                    | Trajectory::GetBarcode
                    | Trajectory::GetHot
                    | Trajectory::GetPut
                    | Trajectory::GetPutBarcode
                    | Trajectory::GetPutHot
                    | Trajectory::Pick
                    | Trajectory::GotoDif
                    | Trajectory::PutPlate
                    | Trajectory::GetPlate
                    | Trajectory::PlateToDif
            ),
            Command::Lid { .. }
            | Command::DewarRegulation { .. }
            | Command::InitDewar(_)
            | Command::VirtualInput { .. }
            | Command::Backup(_)
            | Command::Restore(_) => false,
        }
    }

    fn tool_allowed(&self, _trajectory: Trajectory, tool: i64) -> bool {
        (0..=8).contains(&tool)
    }

    fn layout(&self, trajectory: Trajectory, args: &TrajectoryArgs) -> Vec<String> {
        let tool = args.tool.to_string();
        let detect = u8::from(args.disable_detection).to_string();
        let sample = || {
            vec![
                tool.clone(),
                args.puck_lid.to_string(),
                args.sample.to_string(),
                args.sample_type.to_string(),
                detect.clone(),
            ]
        };
        let shift = || {
            vec![
                args.x_shift.to_string(),
                args.y_shift.to_string(),
                args.z_shift.to_string(),
            ]
        };

        match trajectory {
            Trajectory::Put
            | Trajectory::PutBarcode
            | Trajectory::PutHot
            | Trajectory::GetPut
            | Trajectory::GetPutBarcode
            | Trajectory::GetPutHot => {
                let mut layout = sample();
                layout.extend(shift());
                layout
            }
            Trajectory::Get | Trajectory::GetBarcode | Trajectory::GetHot => {
                let mut layout = vec![tool.clone()];
                layout.extend(shift());
                layout
            }
            Trajectory::Pick | Trajectory::Barcode | Trajectory::GotoDif => sample(),
            Trajectory::PutPlate | Trajectory::PlateToDif => {
                vec![tool.clone(), args.plate.to_string()]
            }
            _ => vec![tool.clone()],
        }
    }
}

/// Positions of the comma-separated `di` values.
pub(crate) const DIGITAL_INPUTS: &[IoSlot] = &[
    IoSlot::new(0, "di_Standby"),
    IoSlot::new(1, "di_Ready"),
    IoSlot::new(2, "di_Running"),
    IoSlot::new(3, "di_Paused"),
    IoSlot::new(4, "di_NoFaultState"),
    IoSlot::new(5, "di_DebugMode"),
    IoSlot::new(6, "di_WarningState"),
    IoSlot::new(7, "di_ManualMode"),
    IoSlot::new(8, "di_EStopTeachPendant"),
    IoSlot::new(9, "di_EStopWorkModeSel"),
    IoSlot::new(10, "di_EStopA"),
    IoSlot::new(11, "di_EStopB"),
    IoSlot::new(12, "di_ShockSensor"),
    IoSlot::new(13, "di_DoorOpen"),
    IoSlot::new(14, "di_InternalFault"),
    IoSlot::new(15, "di_ToolChangerOpened"),
    IoSlot::new(16, "di_GripperAOpened"),
    IoSlot::new(17, "di_GripperAClosed"),
    IoSlot::new(18, "di_GripperBOpened"),
    IoSlot::new(19, "di_GripperBClosed"),
    IoSlot::new(20, "di_BlowingAir"),
    IoSlot::new(21, "di_SingleGripperOpened"),
    IoSlot::new(22, "di_SingleGripperClosed"),
    IoSlot::new(23, "di_ClassicGripperOpened"),
    IoSlot::new(24, "di_ClassicGripperClosed"),
    IoSlot::new(25, "di_OpenLidReq"),
    IoSlot::new(26, "di_CloseLidReq"),
    IoSlot::new(27, "di_AirBlowerReq"),
    IoSlot::new(28, "di_AirSupplyReq"),
    IoSlot::new(29, "di_LN2RegulationReq"),
    IoSlot::new(30, "di_ArmOutOfDewar"),
    IoSlot::new(31, "di_ArmOutOfGonio"),
    IoSlot::new(32, "di_ArmInDewar"),
    IoSlot::new(33, "di_ArmInGonio"),
    IoSlot::new(34, "di_ArmInHomeDry"),
    IoSlot::new(35, "di_DeadManPressed"),
    IoSlot::new(36, "di_UnlockedArmBrake"),
    IoSlot::new(37, "di_SafetyAckSent"),
    IoSlot::new(38, "di_NetworkStarted"),
    IoSlot::new(39, "di_RestartNeeded"),
];

/// Positions of the comma-separated `do` values.
pub(crate) const DIGITAL_OUTPUTS: &[IoSlot] = &[
    IoSlot::new(0, "do_PowerOnReq"),
    IoSlot::new(1, "do_FaultAckReq"),
    IoSlot::new(2, "do_SeqStopReq"),
    IoSlot::new(3, "do_SeqPauseReq"),
    IoSlot::new(4, "do_SeqEndAck"),
    IoSlot::new(5, "do_ManualInpAck"),
    IoSlot::new(6, "do_RoomTempDewar"),
    IoSlot::new(7, "do_ColdCondDewar"),
    IoSlot::new(8, "do_LidOpenedFdbk"),
    IoSlot::new(9, "do_LidClosedFdbk"),
    IoSlot::new(10, "do_OpenGripperAReq"),
    IoSlot::new(11, "do_CloseGripperAReq"),
    IoSlot::new(12, "do_OpenGripperBReq"),
    IoSlot::new(13, "do_CloseGripperBReq"),
    IoSlot::new(14, "do_LN2RegFdbk"),
    IoSlot::new(15, "do_SetGonioMemReq"),
    IoSlot::new(16, "do_SetGripperAMemReq"),
    IoSlot::new(17, "do_SetGripperBMemReq"),
    IoSlot::new(18, "do_ClearMemReq"),
    IoSlot::new(19, "do_ClearSeqParamReq"),
    IoSlot::new(20, "do_RobotMsgReq"),
    IoSlot::new(21, "do_ResetProgMemReq"),
    IoSlot::new(22, "do_PRI4_SOM"),
    IoSlot::new(23, "do_PRI11_MON"),
    IoSlot::new(24, "do_PRO2_IDL"),
    IoSlot::new(25, "do_PRO3_RAH"),
    IoSlot::new(26, "do_PRO4_RI1"),
    IoSlot::new(27, "do_PRO5_RI2"),
    IoSlot::new(28, "do_PRO6_RI3"),
    IoSlot::new(29, "do_PRO7_RI4"),
    IoSlot::new(30, "do_Puck1Presence"),
    IoSlot::new(31, "do_Puck2Presence"),
    IoSlot::new(32, "do_Puck3Presence"),
    IoSlot::new(33, "do_Puck4Presence"),
    IoSlot::new(34, "do_Puck5Presence"),
    IoSlot::new(35, "do_Puck6Presence"),
    IoSlot::new(36, "do_Puck7Presence"),
    IoSlot::new(37, "do_Puck8Presence"),
    IoSlot::new(38, "do_Puck9Presence"),
    IoSlot::new(39, "do_Puck10Presence"),
    IoSlot::new(40, "do_Puck11Presence"),
    IoSlot::new(41, "do_Puck12Presence"),
    IoSlot::new(42, "do_Puck13Presence"),
    IoSlot::new(43, "do_Puck14Presence"),
    IoSlot::new(44, "do_Puck15Presence"),
    IoSlot::new(45, "do_Puck16Presence"),
    IoSlot::new(46, "do_Puck17Presence"),
    IoSlot::new(47, "do_Puck18Presence"),
    IoSlot::new(48, "do_Puck19Presence"),
    IoSlot::new(49, "do_Puck20Presence"),
    IoSlot::new(50, "do_Puck21Presence"),
    IoSlot::new(51, "do_Puck22Presence"),
    IoSlot::new(52, "do_Puck23Presence"),
    IoSlot::new(53, "do_Puck24Presence"),
    IoSlot::new(54, "do_Puck25Presence"),
    IoSlot::new(55, "do_Puck26Presence"),
    IoSlot::new(56, "do_Puck27Presence"),
    IoSlot::new(57, "do_Puck28Presence"),
    IoSlot::new(58, "do_Puck29Presence"),
    IoSlot::new(59, "do_OpenSingleGripperReq"),
    IoSlot::new(60, "do_CloseSingleGripperReq"),
    IoSlot::new(61, "do_OpenClassicGripperReq"),
    IoSlot::new(62, "do_CloseClassicGripperReq"),
    IoSlot::new(63, "do_CloseClassGripObjDelReq"),
];