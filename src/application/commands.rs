use crate::domain::viewport::{Direction, VisibleRange};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter, EnumString};

/// Logical commands a UI layer issues against a chart session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter, EnumString, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum ChartCommand {
    PanLeft,
    PanRight,
    ZoomIn,
    ZoomOut,
    ResetToLatest,
}

impl ChartCommand {
    /// Keyboard binding: arrows pan, `+`/`=` and `-` zoom, `Home` jumps to latest
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Self::PanLeft),
            "ArrowRight" => Some(Self::PanRight),
            "+" | "=" => Some(Self::ZoomIn),
            "-" => Some(Self::ZoomOut),
            "Home" => Some(Self::ResetToLatest),
            _ => None,
        }
    }
}

/// Result of a command that completed without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The range was recomputed; it may be unchanged (e.g. flush with an edge)
    Moved(VisibleRange),
    /// A boundary load resolved and was merged. `added == 0` means no more data.
    Loaded {
        direction: Direction,
        added: usize,
        range: VisibleRange,
    },
    /// The edge was already loading; the request was dropped
    LoadInFlight,
    /// The session was switched or closed while the load was in flight
    Discarded,
}

impl CommandOutcome {
    pub fn range(&self) -> Option<VisibleRange> {
        match self {
            Self::Moved(range) | Self::Loaded { range, .. } => Some(*range),
            Self::LoadInFlight | Self::Discarded => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn command_names_are_kebab_case() {
        let names: Vec<String> = ChartCommand::iter().map(|c| c.to_string()).collect();
        assert_eq!(names, ["pan-left", "pan-right", "zoom-in", "zoom-out", "reset-to-latest"]);
        assert_eq!("reset-to-latest".parse::<ChartCommand>().unwrap(), ChartCommand::ResetToLatest);
    }

    #[test]
    fn key_bindings() {
        assert_eq!(ChartCommand::from_key("ArrowLeft"), Some(ChartCommand::PanLeft));
        assert_eq!(ChartCommand::from_key("="), Some(ChartCommand::ZoomIn));
        assert_eq!(ChartCommand::from_key("+"), Some(ChartCommand::ZoomIn));
        assert_eq!(ChartCommand::from_key("Home"), Some(ChartCommand::ResetToLatest));
        assert_eq!(ChartCommand::from_key("a"), None);
    }
}
