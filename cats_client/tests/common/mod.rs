//! Stub controller shared by the integration tests.
//!
//! Listens on two loopback ports like the real controller. The monitor side
//! answers from a mutable [`Replies`] table, the operate side echoes every
//! command (or answers with a forced reply) and records what it received.

#![allow(dead_code)]

use cats_common::robot::config::{FramingMode, RobotConfig};
use cats_common::robot::model::Model;
use parking_lot::Mutex;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

/// Monitor replies, one per query, plus operate-side overrides.
#[derive(Debug, Clone, Default)]
pub struct Replies {
    pub state: String,
    pub di: String,
    pub di2: String,
    pub outputs: String,
    pub position: String,
    pub message: String,
    /// Answer every operate command with this instead of echoing it.
    pub operate: Option<String>,
    /// Close the monitor connection when this query arrives.
    pub hang_up_on: Option<String>,
}

pub struct StubController {
    pub operate_port: u16,
    pub monitor_port: u16,
    pub replies: Arc<Mutex<Replies>>,
    pub received: Arc<Mutex<Vec<String>>>,
}

impl StubController {
    pub fn start(replies: Replies) -> Self {
        let replies = Arc::new(Mutex::new(replies));
        let received = Arc::new(Mutex::new(Vec::new()));

        let operate_port = {
            let replies = Arc::clone(&replies);
            let received = Arc::clone(&received);
            serve(move |command| {
                received.lock().push(command.to_string());
                Some(replies.lock().operate.clone().unwrap_or_else(|| command.to_string()))
            })
        };
        let monitor_port = {
            let replies = Arc::clone(&replies);
            serve(move |query| {
                let replies = replies.lock();
                if replies.hang_up_on.as_deref() == Some(query) {
                    return None;
                }
                Some(match query {
                    "state" => replies.state.clone(),
                    "di" => replies.di.clone(),
                    "di2" => replies.di2.clone(),
                    "do" => replies.outputs.clone(),
                    "position" => replies.position.clone(),
                    "message" => replies.message.clone(),
                    other => format!("{other}()"),
                })
            })
        };

        Self {
            operate_port,
            monitor_port,
            replies,
            received,
        }
    }

    /// Client configuration pointing at this stub.
    pub fn config(&self, model: Model) -> RobotConfig {
        RobotConfig {
            operate_port: self.operate_port,
            monitor_port: self.monitor_port,
            read_timeout_ms: 1000,
            framing: FramingMode::Delimited,
            ..RobotConfig::new("127.0.0.1", model)
        }
    }

    pub fn update(&self, change: impl FnOnce(&mut Replies)) {
        change(&mut self.replies.lock());
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }
}

/// Accept connections forever, answering each `\r`-terminated request.
fn serve<F>(reply: F) -> u16
where
    F: Fn(&str) -> Option<String> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let reply = Arc::new(reply);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let reply = Arc::clone(&reply);
            thread::spawn(move || handle(stream, reply.as_ref()));
        }
    });
    port
}

fn handle<F>(stream: TcpStream, reply: &F)
where
    F: Fn(&str) -> Option<String>,
{
    let Ok(mut writer) = stream.try_clone() else {
        return;
    };
    let mut reader = BufReader::new(stream);
    let mut request = Vec::new();
    while reader.read_until(b'\r', &mut request).unwrap_or(0) > 0 {
        let text = String::from_utf8_lossy(&request)
            .trim_end_matches('\r')
            .to_string();
        request.clear();
        match reply(&text) {
            Some(answer) => {
                if writer.write_all(format!("{answer}\r").as_bytes()).is_err() {
                    return;
                }
            }
            None => return,
        }
    }
}

// ─── Telemetry fixtures ─────────────────────────────────────────────

/// Model A telemetry builder.
#[derive(Debug, Clone)]
pub struct CatsTelemetry {
    pub path: String,
    pub running: bool,
    pub lid_on_diff: i64,
    pub sample_on_diff: i64,
    pub sample_on_magnet: bool,
    pub idle: bool,
    pub area1: bool,
    pub area2: bool,
}

impl Default for CatsTelemetry {
    fn default() -> Self {
        Self {
            path: String::new(),
            running: false,
            lid_on_diff: 2,
            sample_on_diff: 7,
            sample_on_magnet: false,
            idle: true,
            area1: false,
            area2: false,
        }
    }
}

impl CatsTelemetry {
    pub fn replies(&self) -> Replies {
        let flag = |b: bool| if b { '1' } else { '0' };
        let state = format!(
            "state(1,1,0,Single,{},-1,-1,{},{},0,0,,{},1,0,100.0,0,0,0,0,,,0,1,1,1)",
            self.path,
            self.lid_on_diff,
            self.sample_on_diff,
            flag(self.running)
        );

        let mut di = vec!['0'; 99];
        di[11] = flag(self.sample_on_magnet);
        di[12] = '1';
        let mut outputs = vec!['0'; 99];
        outputs[47] = flag(self.idle);
        outputs[48] = flag(self.idle && !self.running);
        outputs[49] = flag(self.area1);
        outputs[50] = flag(self.area2);

        Replies {
            state,
            di: format!("di({})", di.iter().collect::<String>()),
            outputs: format!("do({})", outputs.iter().collect::<String>()),
            position: "position(10.5,20.25,-3.1234,0,90,180)".into(),
            message: "Robot in home position".into(),
            ..Replies::default()
        }
    }

    pub fn with(mut self, change: impl FnOnce(&mut Self)) -> Self {
        change(&mut self);
        self
    }
}

/// Model C telemetry: idle controller, pucks 1 and 3 present.
pub fn isara2_idle() -> Replies {
    let mut state = vec![String::new(); 52];
    state[0] = "1".into(); // Powered
    state[3] = "Double".into(); // Tool
    state[8] = "4".into(); // NumPuckOnTool
    state[12] = "5".into(); // NumPuckOnDiff
    state[13] = "12".into(); // NumSampleOnDiff
    state[17] = "0".into(); // PathRunning
    state[19] = "80.0".into(); // SpeedRatio

    let inputs = vec!["0"; 40].join(",");
    let mut outputs = vec!["0"; 64];
    outputs[24] = "1"; // idle
    outputs[25] = "1"; // home
    outputs[30] = "1"; // puck 1
    outputs[32] = "1"; // puck 3

    Replies {
        state: format!("state({})", state.join(",")),
        di: format!("di({inputs})"),
        outputs: format!("do({})", outputs.join(",")),
        ..Replies::default()
    }
}

/// Model B telemetry: idle controller, every other puck present.
pub fn isara_idle() -> Replies {
    let state = "state(1,1,0,Double,,-1,-1,3,9,0,0,,0,1,0,100.0,0,0,0,0,,,0,1,1,1)";
    let mut outputs = vec!['0'; 99];
    outputs[47] = '1'; // idle
    outputs[48] = '1'; // home
    let presence: String = (0..29).map(|i| if i % 2 == 0 { '1' } else { '0' }).collect();

    Replies {
        state: state.into(),
        di: format!("di({})", "0".repeat(99)),
        outputs: format!("do({})", outputs.iter().collect::<String>()),
        di2: format!("di2({presence})"),
        ..Replies::default()
    }
}
