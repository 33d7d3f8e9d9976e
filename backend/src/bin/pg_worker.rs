//! Lifecycle helper for the embedded PostgreSQL test cluster.
//!
//! `pg-embed-setup-unpriv` drops privileges by re-running cluster steps in a
//! separate process when the test suite runs as root. Point
//! `PG_EMBEDDED_WORKER` at this binary so the Diesel suites can do that.
//!
//! ```text
//! pg_worker <setup|start|stop> <payload.json>
//! ```
//!
//! The payload is a serialised
//! [`pg_embedded_setup_unpriv::worker::WorkerPayload`].

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Report, Result, WrapErr, bail, eyre};
use pg_embedded_setup_unpriv::worker::{PlainSecret, WorkerPayload};
use postgresql_embedded::PostgreSQL;
use tokio::runtime::Builder;

fn main() -> Result<()> {
    color_eyre::install()?;
    let invocation = Invocation::from_args(env::args_os())?;
    invocation.run()
}

/// Cluster step requested by the parent process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Setup,
    Start,
    Stop,
}

impl Step {
    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => Err(eyre!("unknown cluster step '{other}' (expected setup, start or stop)")),
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

#[derive(Debug)]
struct Invocation {
    step: Step,
    payload: PathBuf,
}

impl Invocation {
    fn from_args(args: impl IntoIterator<Item = OsString>) -> Result<Self> {
        let mut args = args.into_iter().skip(1);
        let step = args
            .next()
            .ok_or_else(|| eyre!("missing cluster step argument"))?;
        let payload = args
            .next()
            .ok_or_else(|| eyre!("missing payload path argument"))?;
        if let Some(extra) = args.next() {
            bail!("unexpected argument '{}'", extra.to_string_lossy());
        }
        Ok(Self {
            step: Step::parse(&step.to_string_lossy())?,
            payload: PathBuf::from(payload),
        })
    }

    fn run(self) -> Result<()> {
        let payload = read_payload(&self.payload)?;
        let settings = payload
            .settings
            .into_settings()
            .map_err(|err| Report::new(err).wrap_err("payload settings are unusable"))?;
        export_environment(payload.environment);

        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .wrap_err("failed to build worker runtime")?;
        let mut cluster = PostgreSQL::new(settings);
        let step = self.step;
        runtime
            .block_on(async move {
                match step {
                    Step::Setup => cluster.setup().await,
                    Step::Start => cluster.start().await,
                    Step::Stop => cluster.stop().await,
                }
            })
            .wrap_err_with(|| format!("cluster {step} failed"))
    }
}

fn read_payload(path: &Path) -> Result<WorkerPayload> {
    let raw = fs::read(path).wrap_err_with(|| format!("cannot read {}", path.display()))?;
    serde_json::from_slice(&raw).wrap_err_with(|| format!("cannot parse {}", path.display()))
}

fn export_environment(vars: Vec<(String, Option<PlainSecret>)>) {
    for (name, value) in vars {
        // SAFETY: runs on the main thread before the runtime starts.
        unsafe {
            match value {
                Some(value) => env::set_var(&name, value.expose()),
                None => env::remove_var(&name),
            }
        }
    }
}
