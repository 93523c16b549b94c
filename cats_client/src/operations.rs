//! One method per robot operation.
//!
//! Thin wrappers over [`CatsClient::execute`]. Each returns the controller's
//! reply. Operations the active model lacks fail with `UnsupportedOperation`
//! before anything is sent.
//!
//! # Module Structure
//!
//! - Power and motion control
//! - Dewar, lid and LN2 maintenance
//! - Trajectories
//! - Memory commands
//! - Status queries

use crate::client::CatsClient;
use crate::command::{
    Command, Memory, Query, SampleSlot, Setter, Shift, Simple, Trajectory, TrajectoryArgs,
};
use cats_common::robot::error::ClientError;

type Reply = Result<String, ClientError>;

impl CatsClient {
    fn simple(&self, command: Simple) -> Reply {
        self.execute(&Command::Simple(command))
    }

    /// Send any trajectory with a fully specified argument set.
    pub fn trajectory(&self, trajectory: Trajectory, args: TrajectoryArgs) -> Reply {
        self.execute(&Command::Trajectory(trajectory, args))
    }

    fn tool_only(&self, trajectory: Trajectory, tool: i64) -> Reply {
        self.trajectory(trajectory, TrajectoryArgs::with_tool(tool))
    }

    fn mount(&self, trajectory: Trajectory, tool: i64, slot: SampleSlot, shift: Shift) -> Reply {
        let args = TrajectoryArgs::with_tool(tool)
            .sample(slot.puck_lid, slot.sample, slot.sample_type)
            .shift(shift);
        self.trajectory(trajectory, args)
    }

    // ─── Power and motion ───────────────────────────────────────────

    pub fn power_on(&self) -> Reply {
        self.simple(Simple::PowerOn)
    }

    pub fn power_off(&self) -> Reply {
        self.simple(Simple::PowerOff)
    }

    pub fn panic(&self) -> Reply {
        self.simple(Simple::Panic)
    }

    pub fn abort(&self) -> Reply {
        self.simple(Simple::Abort)
    }

    pub fn pause(&self) -> Reply {
        self.simple(Simple::Pause)
    }

    pub fn reset(&self) -> Reply {
        self.simple(Simple::Reset)
    }

    pub fn restart(&self) -> Reply {
        self.simple(Simple::Restart)
    }

    pub fn speed_up(&self) -> Reply {
        self.simple(Simple::SpeedUp)
    }

    pub fn speed_down(&self) -> Reply {
        self.simple(Simple::SpeedDown)
    }

    pub fn remote_speed(&self, on: bool) -> Reply {
        self.simple(if on {
            Simple::RemoteSpeedOn
        } else {
            Simple::RemoteSpeedOff
        })
    }

    pub fn reset_motion(&self) -> Reply {
        self.simple(Simple::ResetMotion)
    }

    pub fn clear_memory(&self) -> Reply {
        self.simple(Simple::ClearMemory)
    }

    pub fn reset_parameters(&self) -> Reply {
        self.simple(Simple::ResetParameters)
    }

    pub fn clear_barcode(&self) -> Reply {
        self.simple(Simple::ClearBarcode)
    }

    // ─── Tools ──────────────────────────────────────────────────────

    pub fn open_tool(&self) -> Reply {
        self.simple(Simple::OpenTool)
    }

    pub fn close_tool(&self) -> Reply {
        self.simple(Simple::CloseTool)
    }

    pub fn open_tool2(&self) -> Reply {
        self.simple(Simple::OpenTool2)
    }

    pub fn close_tool2(&self) -> Reply {
        self.simple(Simple::CloseTool2)
    }

    pub fn magnet(&self, on: bool) -> Reply {
        self.simple(if on { Simple::MagnetOn } else { Simple::MagnetOff })
    }

    pub fn heater(&self, on: bool) -> Reply {
        self.simple(if on { Simple::HeaterOn } else { Simple::HeaterOff })
    }

    // ─── Dewar and LN2 ──────────────────────────────────────────────

    pub fn open_lid(&self) -> Reply {
        self.simple(Simple::OpenLid)
    }

    pub fn close_lid(&self) -> Reply {
        self.simple(Simple::CloseLid)
    }

    /// `openlidN` / `closelidN` for lid 1..=4.
    pub fn set_lid(&self, lid: u8, open: bool) -> Reply {
        self.execute(&Command::Lid { lid, open })
    }

    pub fn regulation(&self, on: bool) -> Reply {
        self.simple(if on {
            Simple::RegulationOn
        } else {
            Simple::RegulationOff
        })
    }

    /// LN2 regulation of one dewar (1 or 2).
    pub fn dewar_regulation(&self, dewar: u8, on: bool) -> Reply {
        self.execute(&Command::DewarRegulation { dewar, on })
    }

    pub fn init_dewar(&self, dewar: u8) -> Reply {
        self.execute(&Command::InitDewar(dewar))
    }

    pub fn warming(&self, on: bool) -> Reply {
        self.simple(if on {
            Simple::WarmingOn
        } else {
            Simple::WarmingOff
        })
    }

    pub fn phase_separator_regulation(&self, on: bool) -> Reply {
        self.simple(if on {
            Simple::PhaseSeparatorRegulationOn
        } else {
            Simple::PhaseSeparatorRegulationOff
        })
    }

    pub fn dewar_cooling_regulation(&self, on: bool) -> Reply {
        self.simple(if on {
            Simple::DewarCoolingRegulationOn
        } else {
            Simple::DewarCoolingRegulationOff
        })
    }

    pub fn static_dewar(&self) -> Reply {
        self.simple(Simple::StaticDewar)
    }

    pub fn rotating_dewar(&self) -> Reply {
        self.simple(Simple::RotatingDewar)
    }

    /// Toggle virtual digital input 90..=99.
    pub fn virtual_input(&self, input: u8, on: bool) -> Reply {
        self.execute(&Command::VirtualInput { input, on })
    }

    pub fn backup(&self, usb_port: u8) -> Reply {
        self.execute(&Command::Backup(usb_port))
    }

    pub fn restore(&self, usb_port: u8) -> Reply {
        self.execute(&Command::Restore(usb_port))
    }

    /// ISARA2 numeric setting (speed, LN2 levels, timers).
    pub fn set(&self, setter: Setter, value: f64) -> Reply {
        self.execute(&Command::Setter(setter, value))
    }

    // ─── Trajectories ───────────────────────────────────────────────

    pub fn home(&self, tool: i64) -> Reply {
        self.tool_only(Trajectory::Home, tool)
    }

    pub fn safe(&self, tool: i64) -> Reply {
        self.tool_only(Trajectory::Safe, tool)
    }

    pub fn recover(&self, tool: i64) -> Reply {
        self.tool_only(Trajectory::Recover, tool)
    }

    pub fn put(&self, tool: i64, slot: SampleSlot, shift: Shift) -> Reply {
        self.mount(Trajectory::Put, tool, slot, shift)
    }

    pub fn put_barcode(&self, tool: i64, slot: SampleSlot, shift: Shift) -> Reply {
        self.mount(Trajectory::PutBarcode, tool, slot, shift)
    }

    /// Mount sample `sample` from the hot puck.
    pub fn put_hot(&self, tool: i64, sample: i64, shift: Shift) -> Reply {
        let slot = SampleSlot {
            sample,
            ..SampleSlot::default()
        };
        self.mount(Trajectory::PutHot, tool, slot, shift)
    }

    pub fn get(&self, tool: i64, shift: Shift) -> Reply {
        self.trajectory(Trajectory::Get, TrajectoryArgs::with_tool(tool).shift(shift))
    }

    pub fn get_barcode(&self, tool: i64, shift: Shift) -> Reply {
        self.trajectory(
            Trajectory::GetBarcode,
            TrajectoryArgs::with_tool(tool).shift(shift),
        )
    }

    pub fn get_hot(&self, tool: i64, shift: Shift) -> Reply {
        self.trajectory(Trajectory::GetHot, TrajectoryArgs::with_tool(tool).shift(shift))
    }

    /// Unmount the current sample and mount `slot` in one path.
    pub fn getput(&self, tool: i64, slot: SampleSlot, shift: Shift) -> Reply {
        self.mount(Trajectory::GetPut, tool, slot, shift)
    }

    pub fn getput_barcode(&self, tool: i64, slot: SampleSlot, shift: Shift) -> Reply {
        self.mount(Trajectory::GetPutBarcode, tool, slot, shift)
    }

    pub fn getput_hot(&self, tool: i64, sample: i64, shift: Shift) -> Reply {
        let slot = SampleSlot {
            sample,
            ..SampleSlot::default()
        };
        self.mount(Trajectory::GetPutHot, tool, slot, shift)
    }

    /// CATS getput that leaves the next sample picked on the second jaw.
    pub fn getput_pick(&self, tool: i64, slot: SampleSlot, shift: Shift) -> Reply {
        self.mount(Trajectory::GetPutPick, tool, slot, shift)
    }

    pub fn barcode(&self, tool: i64, slot: SampleSlot) -> Reply {
        self.mount(Trajectory::Barcode, tool, slot, Shift::default())
    }

    /// Return the sample held by the gripper to the dewar.
    pub fn back(&self, tool: i64) -> Reply {
        self.tool_only(Trajectory::Back, tool)
    }

    pub fn back_hot(&self, tool: i64) -> Reply {
        self.tool_only(Trajectory::BackHot, tool)
    }

    /// Move a sample between dewar positions.
    pub fn transfer(&self, tool: i64, from: SampleSlot, to_puck_lid: i64, to_sample: i64) -> Reply {
        let mut args =
            TrajectoryArgs::with_tool(tool).sample(from.puck_lid, from.sample, from.sample_type);
        args.new_puck_lid = to_puck_lid;
        args.new_sample = to_sample;
        self.trajectory(Trajectory::Transfer, args)
    }

    /// Pre-load a sample on the second gripper jaw.
    pub fn pick(&self, tool: i64, slot: SampleSlot) -> Reply {
        self.mount(Trajectory::Pick, tool, slot, Shift::default())
    }

    /// Soak the gripper in the dewar; `puck_lid` 0 uses the default position.
    pub fn soak(&self, tool: i64, puck_lid: i64) -> Reply {
        let args = TrajectoryArgs {
            puck_lid,
            ..TrajectoryArgs::with_tool(tool)
        };
        self.trajectory(Trajectory::Soak, args)
    }

    pub fn dry(&self, tool: i64) -> Reply {
        self.tool_only(Trajectory::Dry, tool)
    }

    /// Dry the gripper, then return home.
    pub fn dry_home(&self, tool: i64) -> Reply {
        self.tool_only(Trajectory::DryHome, tool)
    }

    pub fn goto_dif(&self, tool: i64, slot: SampleSlot) -> Reply {
        self.mount(Trajectory::GotoDif, tool, slot, Shift::default())
    }

    pub fn tool_calibration(&self, tool: i64) -> Reply {
        self.tool_only(Trajectory::ToolCalibration, tool)
    }

    pub fn change_tool(&self, tool: i64) -> Reply {
        self.tool_only(Trajectory::ChangeTool, tool)
    }

    /// Put the puck cap back on its lid.
    pub fn cap_on_lid(&self, tool: i64) -> Reply {
        self.tool_only(Trajectory::CapOnLid, tool)
    }

    pub fn cap_off_lid(&self, tool: i64) -> Reply {
        self.tool_only(Trajectory::CapOffLid, tool)
    }

    pub fn put_plate(&self, tool: i64, plate: i64) -> Reply {
        let args = TrajectoryArgs {
            plate,
            ..TrajectoryArgs::with_tool(tool)
        };
        self.trajectory(Trajectory::PutPlate, args)
    }

    pub fn get_plate(&self, tool: i64) -> Reply {
        self.tool_only(Trajectory::GetPlate, tool)
    }

    pub fn getput_plate(&self, tool: i64, plate: i64) -> Reply {
        let args = TrajectoryArgs {
            plate,
            ..TrajectoryArgs::with_tool(tool)
        };
        self.trajectory(Trajectory::GetPutPlate, args)
    }

    pub fn plate_to_dif(&self, tool: i64, plate: i64) -> Reply {
        let args = TrajectoryArgs {
            plate,
            ..TrajectoryArgs::with_tool(tool)
        };
        self.trajectory(Trajectory::PlateToDif, args)
    }

    /// Scan the puck presence of one CATS lid.
    pub fn puck_detect(&self, lid: i64) -> Reply {
        let args = TrajectoryArgs {
            puck_lid: lid,
            ..TrajectoryArgs::default()
        };
        self.trajectory(Trajectory::PuckDetect, args)
    }

    pub fn read_position(&self, tool: i64, lid: i64) -> Reply {
        let args = TrajectoryArgs {
            puck_lid: lid,
            ..TrajectoryArgs::with_tool(tool)
        };
        self.trajectory(Trajectory::ReadPosition, args)
    }

    // ─── Memory ─────────────────────────────────────────────────────

    /// Declare which sample sits on the diffractometer.
    pub fn set_on_diff(&self, slot: SampleSlot) -> Reply {
        self.execute(&Command::Memory(Memory::SetOnDiff, slot))
    }

    pub fn set_tool(&self, slot: SampleSlot) -> Reply {
        self.execute(&Command::Memory(Memory::SetTool, slot))
    }

    pub fn set_tool2(&self, slot: SampleSlot) -> Reply {
        self.execute(&Command::Memory(Memory::SetTool2, slot))
    }

    // ─── Queries ────────────────────────────────────────────────────

    pub fn query_state(&self) -> Reply {
        self.query(Query::State)
    }

    pub fn query_message(&self) -> Reply {
        self.query(Query::Message)
    }

    /// Controller configuration dump.
    pub fn query_config(&self) -> Reply {
        self.query(Query::Config)
    }
}
