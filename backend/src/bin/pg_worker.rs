//! Cluster lifecycle helper for the embedded PostgreSQL used by the
//! integration tests.
//!
//! `pg_embedded_setup_unpriv` refuses to run PostgreSQL as root, so when the
//! test suite runs with root privileges it hands each lifecycle step to this
//! binary instead. Invocation: `pg_worker <setup|start|stop> <payload.json>`,
//! where the payload is a serialised [`WorkerPayload`].

use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::path::Path;

use color_eyre::eyre::{Context, Report, Result, eyre};
use pg_embedded_setup_unpriv::worker::WorkerPayload;
use postgresql_embedded::PostgreSQL;
use tokio::runtime::Builder;

fn main() -> Result<()> {
    color_eyre::install()?;
    let (step, payload_path) = parse_args(env::args_os())?;
    let payload = read_payload(Path::new(&payload_path))?;
    run_step(step, payload)
}

fn parse_args(mut args: impl Iterator<Item = OsString>) -> Result<(Step, OsString)> {
    let _program = args.next();
    let step = args
        .next()
        .ok_or_else(|| eyre!("usage: pg_worker <setup|start|stop> <payload.json>"))?;
    let step = Step::parse(&step)?;
    let payload_path = args
        .next()
        .ok_or_else(|| eyre!("missing payload path for {step}"))?;
    if let Some(extra) = args.next() {
        return Err(eyre!(
            "unexpected extra argument: {}",
            extra.to_string_lossy()
        ));
    }
    Ok((step, payload_path))
}

fn read_payload(path: &Path) -> Result<WorkerPayload> {
    let raw = fs::read(path).with_context(|| format!("failed to read payload {}", path.display()))?;
    serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse payload {}", path.display()))
}

fn run_step(step: Step, payload: WorkerPayload) -> Result<()> {
    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| Report::new(err).wrap_err("invalid postgres settings in payload"))?;
    for (key, value) in payload.environment {
        // SAFETY: single-threaded at this point; the runtime is built below.
        match value {
            Some(value) => unsafe { env::set_var(&key, value.expose()) },
            None => unsafe { env::remove_var(&key) },
        }
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to build worker runtime")?;
    let mut postgres = PostgreSQL::new(settings);
    runtime
        .block_on(async move {
            match step {
                Step::Setup => postgres.setup().await,
                Step::Start => postgres.start().await,
                Step::Stop => postgres.stop().await,
            }
        })
        .with_context(|| format!("embedded postgres {step} failed"))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Setup,
    Start,
    Stop,
}

impl Step {
    fn parse(raw: &OsStr) -> Result<Self> {
        match raw.to_string_lossy().as_ref() {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(eyre!(
                "unknown step '{other}'; expected setup, start, or stop"
            )),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setup => "setup",
            Self::Start => "start",
            Self::Stop => "stop",
        })
    }
}
