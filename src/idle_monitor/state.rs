use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The two values a state file may hold once it exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityState {
    Idle,
    Active,
}

impl ActivityState {
    pub fn from_idle_flag(is_idle: bool) -> Self {
        if is_idle { ActivityState::Idle } else { ActivityState::Active }
    }

    fn as_str(self) -> &'static str {
        match self {
            ActivityState::Idle => "idle",
            ActivityState::Active => "active",
        }
    }

    fn parse(text: &str) -> Option<Self> {
        match text {
            "idle" => Some(ActivityState::Idle),
            "active" => Some(ActivityState::Active),
            _ => None,
        }
    }
}

impl fmt::Display for ActivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct StateTransition {
    pub previous: Option<ActivityState>,
    /// True only when a prior state existed and differs from the current one.
    /// The very first observation of a printer is not a transition.
    pub changed: bool,
}

/// Keeps one state file per printer, read before every write so state
/// changes can be reported across runs.
pub struct StateStore {
    dir: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn state_path(&self, printer_name: &str) -> PathBuf {
        self.dir.join(format!("printer_idle_{}.state", printer_name.to_lowercase()))
    }

    /// Read the previously stored state, then unconditionally store the
    /// current one. The write happens even when nothing changed.
    pub fn record(&self, printer_name: &str, current: ActivityState) -> io::Result<StateTransition> {
        let path = self.state_path(printer_name);
        let previous = read_state(&path)?;

        // Replace atomically so an interrupted run cannot leave a
        // truncated state file behind.
        let tmp_path = path.with_extension("state.tmp");
        fs::write(&tmp_path, current.as_str())?;
        fs::rename(&tmp_path, &path)?;

        let changed = previous.is_some_and(|prev| prev != current);
        Ok(StateTransition { previous, changed })
    }
}

fn read_state(path: &Path) -> io::Result<Option<ActivityState>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err),
    };
    // Unparseable content counts as no prior state rather than an error.
    Ok(ActivityState::parse(contents.trim()))
}
