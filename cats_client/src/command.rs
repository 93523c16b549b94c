//! Command model and wire encoding.
//!
//! Logical operations are described by [`Command`]; [`CommandEncoder`]
//! checks them against the active [`ModelProfile`] and serializes them as
//! `name(a0,a1,...,an)`. Nothing here touches the network, so an
//! unsupported operation is always rejected before any I/O.

use crate::profile::ModelProfile;
use cats_common::robot::consts::HOT_PUCK_LID;
use cats_common::robot::error::ClientError;

/// Argument-less controller commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Simple {
    PowerOn,
    PowerOff,
    Panic,
    Abort,
    Pause,
    Reset,
    Restart,
    OpenLid,
    CloseLid,
    OpenTool,
    CloseTool,
    OpenTool2,
    CloseTool2,
    MagnetOn,
    MagnetOff,
    HeaterOn,
    HeaterOff,
    RegulationOn,
    RegulationOff,
    WarmingOn,
    WarmingOff,
    PhaseSeparatorRegulationOn,
    PhaseSeparatorRegulationOff,
    DewarCoolingRegulationOn,
    DewarCoolingRegulationOff,
    StaticDewar,
    RotatingDewar,
    ClearBarcode,
    RemoteSpeedOn,
    RemoteSpeedOff,
    SpeedUp,
    SpeedDown,
    ClearMemory,
    ResetParameters,
    ResetMotion,
}

impl Simple {
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::PowerOn => "on",
            Self::PowerOff => "off",
            Self::Panic => "panic",
            Self::Abort => "abort",
            Self::Pause => "pause",
            Self::Reset => "reset",
            Self::Restart => "restart",
            Self::OpenLid => "openlid",
            Self::CloseLid => "closelid",
            Self::OpenTool => "opentool",
            Self::CloseTool => "closetool",
            Self::OpenTool2 => "opentool2",
            Self::CloseTool2 => "closetool2",
            Self::MagnetOn => "magneton",
            Self::MagnetOff => "magnetoff",
            Self::HeaterOn => "heateron",
            Self::HeaterOff => "heateroff",
            Self::RegulationOn => "regulon",
            Self::RegulationOff => "reguloff",
            Self::WarmingOn => "warmon",
            Self::WarmingOff => "warmoff",
            Self::PhaseSeparatorRegulationOn => "ps_regulon",
            Self::PhaseSeparatorRegulationOff => "ps_reguloff",
            Self::DewarCoolingRegulationOn => "dc_regulon",
            Self::DewarCoolingRegulationOff => "dc_reguloff",
            Self::StaticDewar => "1staticdw",
            Self::RotatingDewar => "2rotatingdw",
            Self::ClearBarcode => "clearbcrd",
            Self::RemoteSpeedOn => "remotespeedon",
            Self::RemoteSpeedOff => "remotespeedoff",
            Self::SpeedUp => "speedup",
            Self::SpeedDown => "speeddown",
            Self::ClearMemory => "clear memory",
            Self::ResetParameters => "reset parameters",
            Self::ResetMotion => "resetMotion",
        }
    }
}

/// ISARA2 commands taking one numeric setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setter {
    /// Robot speed ratio in percent.
    Speed,
    HighLn2Level,
    LowLn2Level,
    DewarCoolingHighLn2Level,
    DewarCoolingLowLn2Level,
    /// Seconds before an open lid closes by itself.
    AutoCloseLidTimer,
    MaxSoakTime,
    MaxSoakCount,
    AutoDryTimer,
    GripperCoolingTimer,
}

impl Setter {
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Speed => "setspeed",
            Self::HighLn2Level => "sethighln2",
            Self::LowLn2Level => "setlowln2",
            Self::DewarCoolingHighLn2Level => "dc_sethighln2",
            Self::DewarCoolingLowLn2Level => "dc_setlowln2",
            Self::AutoCloseLidTimer => "setautocloselidtimer",
            Self::MaxSoakTime => "setmaxsoaktime",
            Self::MaxSoakCount => "setmaxsoaknb",
            Self::AutoDryTimer => "setautodrytimer",
            Self::GripperCoolingTimer => "setgrippercoolingtimer",
        }
    }
}

/// Commands rewriting the controller's sample bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Memory {
    /// Declare which sample sits on the diffractometer.
    SetOnDiff,
    /// Declare which sample the tool holds.
    SetTool,
    /// Declare which sample the second gripper holds.
    SetTool2,
}

impl Memory {
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::SetOnDiff => "setdiffr",
            Self::SetTool => "settool",
            Self::SetTool2 => "settool2",
        }
    }
}

/// Robot trajectories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trajectory {
    Home,
    Safe,
    Recover,
    Put,
    PutBarcode,
    PutHot,
    Get,
    GetBarcode,
    GetHot,
    GetPut,
    GetPutBarcode,
    GetPutHot,
    GetPutPick,
    Barcode,
    Back,
    BackHot,
    Transfer,
    Pick,
    Soak,
    Dry,
    DryHome,
    GotoDif,
    ToolCalibration,
    ChangeTool,
    PutPlate,
    GetPlate,
    GetPutPlate,
    PlateToDif,
    GotoWell,
    Adjust,
    Focus,
    Expose,
    Collect,
    SetPlateAngle,
    ReadPosition,
    ReadLoad,
    PuckDetect,
    CapOnLid,
    CapOffLid,
}

impl Trajectory {
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Safe => "safe",
            Self::Recover => "recover",
            Self::Put => "put",
            Self::PutBarcode => "put_bcrd",
            Self::PutHot => "put_HT",
            Self::Get => "get",
            Self::GetBarcode => "get_bcrd",
            Self::GetHot => "get_HT",
            Self::GetPut => "getput",
            Self::GetPutBarcode => "getput_bcrd",
            Self::GetPutHot => "getput_HT",
            Self::GetPutPick => "getputpick",
            Self::Barcode => "barcode",
            Self::Back => "back",
            Self::BackHot => "back_HT",
            Self::Transfer => "transfer",
            Self::Pick => "pick",
            Self::Soak => "soak",
            Self::Dry => "dry",
            Self::DryHome => "dryhome",
            Self::GotoDif => "gotodif",
            Self::ToolCalibration => "toolcal",
            Self::ChangeTool => "changetool",
            Self::PutPlate => "putplate",
            Self::GetPlate => "getplate",
            Self::GetPutPlate => "getputplate",
            Self::PlateToDif => "platetodif",
            Self::GotoWell => "goto_well",
            Self::Adjust => "adjust",
            Self::Focus => "focus",
            Self::Expose => "expose",
            Self::Collect => "collect",
            Self::SetPlateAngle => "setplateangle",
            Self::ReadPosition => "rd_position",
            Self::ReadLoad => "rd_load",
            Self::PuckDetect => "puckdetect",
            Self::CapOnLid => "capOnLid",
            Self::CapOffLid => "capOffLid",
        }
    }

    /// Hot-puck trajectories address the fixed hot puck lid.
    #[inline]
    pub const fn is_hot_puck(self) -> bool {
        matches!(self, Self::PutHot | Self::GetHot | Self::GetPutHot | Self::BackHot)
    }

    /// Trajectories that pick a sample from a puck and need a valid address.
    #[inline]
    pub const fn addresses_sample(self) -> bool {
        matches!(
            self,
            Self::Put
                | Self::PutBarcode
                | Self::GetPut
                | Self::GetPutBarcode
                | Self::GetPutPick
                | Self::Barcode
                | Self::GotoDif
                | Self::Pick
                | Self::Transfer
        )
    }

    /// The tool is implied by the trajectory and not checked.
    #[inline]
    pub const fn has_fixed_tool(self) -> bool {
        matches!(self, Self::PuckDetect)
    }
}

/// Arguments of a trajectory, by meaning.
///
/// Each dialect decides which of them end up on the wire and where.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrajectoryArgs {
    pub tool: i64,
    pub puck_lid: i64,
    pub sample: i64,
    pub new_puck_lid: i64,
    pub new_sample: i64,
    pub plate: i64,
    pub well: i64,
    pub sample_type: i64,
    pub drop: i64,
    pub toolcal: i64,
    pub x_shift: f64,
    pub y_shift: f64,
    pub z_shift: f64,
    pub angle: f64,
    pub oscillations: i64,
    pub exp_time: f64,
    pub step: f64,
    pub final_angle: f64,
    /// ISARA2 only: skip the sample presence check of the gripper.
    pub disable_detection: bool,
}

impl TrajectoryArgs {
    pub fn with_tool(tool: i64) -> Self {
        Self {
            tool,
            ..Self::default()
        }
    }

    pub fn sample(mut self, puck_lid: i64, sample: i64, sample_type: i64) -> Self {
        self.puck_lid = puck_lid;
        self.sample = sample;
        self.sample_type = sample_type;
        self
    }

    pub fn toolcal(mut self, toolcal: i64) -> Self {
        self.toolcal = toolcal;
        self
    }

    pub fn shift(mut self, shift: Shift) -> Self {
        self.x_shift = shift.x;
        self.y_shift = shift.y;
        self.z_shift = shift.z;
        self
    }

    pub fn disable_detection(mut self, disable: bool) -> Self {
        self.disable_detection = disable;
        self
    }

    /// Copy with the hot puck lid substituted.
    pub(crate) fn on_hot_puck(&self) -> Self {
        Self {
            puck_lid: HOT_PUCK_LID,
            ..self.clone()
        }
    }
}

/// Goniometer shift applied when mounting, in microns.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Shift {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Shift {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Sample identity written by memory commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleSlot {
    pub puck_lid: i64,
    pub sample: i64,
    pub sample_type: i64,
}

/// A side-effecting operation for the operate channel.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Simple(Simple),
    /// `openlidN` / `closelidN`.
    Lid { lid: u8, open: bool },
    /// `regulonN` / `reguloffN`.
    DewarRegulation { dewar: u8, on: bool },
    /// `initdewN`.
    InitDewar(u8),
    /// `vdiNNon` / `vdiNNoff`.
    VirtualInput { input: u8, on: bool },
    /// Save controller parameters to a USB port.
    Backup(u8),
    /// Restore controller parameters from a USB port.
    Restore(u8),
    Setter(Setter, f64),
    Trajectory(Trajectory, TrajectoryArgs),
    Memory(Memory, SampleSlot),
}

impl Command {
    /// Operation name as used in error reports.
    pub fn operation(&self) -> String {
        match self {
            Self::Simple(s) => s.wire_name().to_string(),
            Self::Lid { lid, open: true } => format!("openlid{lid}"),
            Self::Lid { lid, open: false } => format!("closelid{lid}"),
            Self::DewarRegulation { dewar, on: true } => format!("regulon{dewar}"),
            Self::DewarRegulation { dewar, on: false } => format!("reguloff{dewar}"),
            Self::InitDewar(dewar) => format!("initdew{dewar}"),
            Self::VirtualInput { input, on: true } => format!("vdi{input}on"),
            Self::VirtualInput { input, on: false } => format!("vdi{input}off"),
            Self::Backup(_) => "backup".to_string(),
            Self::Restore(_) => "restore".to_string(),
            Self::Setter(s, _) => s.wire_name().to_string(),
            Self::Trajectory(t, _) => t.wire_name().to_string(),
            Self::Memory(m, _) => m.wire_name().to_string(),
        }
    }
}

/// Read-only queries for the monitor channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    State,
    DigitalInputs,
    /// ISARA puck presence bits.
    SecondaryInputs,
    DigitalOutputs,
    Position,
    Message,
    Config,
}

impl Query {
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::State => "state",
            Self::DigitalInputs => "di",
            Self::SecondaryInputs => "di2",
            Self::DigitalOutputs => "do",
            Self::Position => "position",
            Self::Message => "message",
            Self::Config => "config",
        }
    }
}

/// Serializes commands in the dialect of one controller model.
#[derive(Debug, Clone, Copy)]
pub struct CommandEncoder<'a> {
    profile: &'a ModelProfile,
}

impl<'a> CommandEncoder<'a> {
    pub fn new(profile: &'a ModelProfile) -> Self {
        Self { profile }
    }

    /// Validate `command` and produce its wire text (without terminator).
    ///
    /// # Errors
    ///
    /// - `UnsupportedOperation` if the model does not know the command
    /// - `InvalidArgument` if a tool, lid, puck or setpoint is out of range
    pub fn encode(&self, command: &Command) -> Result<String, ClientError> {
        if !self.profile.supports(command) {
            return Err(ClientError::UnsupportedOperation {
                operation: command.operation(),
                model: self.profile.model,
            });
        }

        match command {
            Command::Simple(s) => Ok(s.wire_name().to_string()),
            Command::Lid { lid, .. } => {
                check_range("lid", i64::from(*lid), 1, 4)?;
                Ok(command.operation())
            }
            Command::DewarRegulation { dewar, .. } | Command::InitDewar(dewar) => {
                check_range("dewar", i64::from(*dewar), 1, 2)?;
                Ok(command.operation())
            }
            Command::VirtualInput { input, .. } => {
                check_range("virtual input", i64::from(*input), 90, 99)?;
                Ok(command.operation())
            }
            Command::Backup(port) => Ok(format!("backup({port})")),
            Command::Restore(port) => Ok(format!("restore({port})")),
            Command::Setter(setter, value) => {
                if !value.is_finite() || *value < 0.0 {
                    return Err(ClientError::InvalidArgument(format!(
                        "{} expects a non-negative value, got {}",
                        setter.wire_name(),
                        value
                    )));
                }
                Ok(format!("{}({})", setter.wire_name(), value))
            }
            Command::Memory(memory, slot) => Ok(format!(
                "{}({},{},{})",
                memory.wire_name(),
                slot.puck_lid,
                slot.sample,
                slot.sample_type
            )),
            Command::Trajectory(trajectory, args) => {
                self.check_trajectory(*trajectory, args)?;
                let args = if trajectory.is_hot_puck() {
                    args.on_hot_puck()
                } else {
                    args.clone()
                };
                let layout = self.profile.layout(*trajectory, &args);
                Ok(format!("{}({})", trajectory.wire_name(), layout.join(",")))
            }
        }
    }

    fn check_trajectory(&self, trajectory: Trajectory, args: &TrajectoryArgs) -> Result<(), ClientError> {
        if !trajectory.has_fixed_tool() && !self.profile.tool_allowed(trajectory, args.tool) {
            return Err(ClientError::InvalidArgument(format!(
                "tool {} is not allowed for {} on {}",
                args.tool,
                trajectory.wire_name(),
                self.profile.model
            )));
        }

        let max_puck_lid = self.profile.max_puck_lid;
        if trajectory.addresses_sample() {
            check_range("puck/lid", args.puck_lid, 1, max_puck_lid)?;
            if args.sample < 1 {
                return Err(ClientError::InvalidArgument(format!(
                    "sample must be at least 1, got {}",
                    args.sample
                )));
            }
        }

        match trajectory {
            Trajectory::Transfer => {
                check_range("new puck/lid", args.new_puck_lid, 1, max_puck_lid)?;
                if args.new_sample < 1 {
                    return Err(ClientError::InvalidArgument(format!(
                        "new sample must be at least 1, got {}",
                        args.new_sample
                    )));
                }
            }
            Trajectory::ReadPosition | Trajectory::PuckDetect => {
                check_range("puck/lid", args.puck_lid, 1, max_puck_lid)?;
            }
            Trajectory::Soak if args.puck_lid != 0 => {
                check_range("puck/lid", args.puck_lid, 1, max_puck_lid)?;
            }
            _ => {}
        }

        Ok(())
    }
}

fn check_range(what: &str, value: i64, min: i64, max: i64) -> Result<(), ClientError> {
    if value < min || value > max {
        return Err(ClientError::InvalidArgument(format!(
            "{what} must be in {min}..={max}, got {value}"
        )));
    }
    Ok(())
}
