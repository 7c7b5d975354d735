//! Interactive session over one layer.
//!
//! The process is the plugin session: the ghost set lives as long as the
//! shell does, so `hide` calls accumulate until `reveal`.

use std::io::{BufRead, Write};

use anyhow::Result;
use ghost_points_core::layer::{MapLayer, VectorLayer};
use ghost_points_core::models::FeatureId;
use ghost_points_core::SqliteLayer;

use crate::plugin::{ActionId, ActionOutcome, ActionRegistry, GhostPoints};
use crate::status::StatusReport;
use crate::terminal::TerminalNotifier;

const HELP: &str = "\
Commands:
  select <id>...   replace the selection
  hide [<id>...]   ghost the selection (or the given ids)
  reveal           reveal all ghosted features
  restore          adopt features flagged hidden by an earlier session
  status           show the ghosting state
  actions          list toolbar actions
  help             show this help
  quit             leave the session
";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Select(Vec<FeatureId>),
    Hide(Vec<FeatureId>),
    Reveal,
    Restore,
    Status,
    Actions,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        return Ok(None);
    };
    let ids = || {
        line.split_whitespace()
            .skip(1)
            .map(|w| w.parse::<FeatureId>().map_err(|_| format!("Invalid feature id: {}", w)))
            .collect::<Result<Vec<_>, _>>()
    };

    let command = match name {
        "select" => Command::Select(ids()?),
        "hide" | "ghost" => Command::Hide(ids()?),
        "reveal" | "banish" => Command::Reveal,
        "restore" => Command::Restore,
        "status" => Command::Status,
        "actions" => Command::Actions,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("Unknown command: {} (try 'help')", other)),
    };
    Ok(Some(command))
}

/// Runs the read-eval loop until `quit` or end of input.
pub fn run<R: BufRead, W: Write>(
    layer: &mut SqliteLayer<'_>,
    plugin: &mut GhostPoints,
    term: &mut TerminalNotifier<R, W>,
) -> Result<()> {
    let mut toolbar = ActionRegistry::default();
    plugin.init_gui(&mut toolbar);

    loop {
        write!(term.output(), "ghost> ")?;
        term.output().flush()?;
        let Some(line) = term.read_line()? else {
            writeln!(term.output())?;
            break;
        };

        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                writeln!(term.output(), "{}", message)?;
                continue;
            }
        };

        match command {
            Command::Select(ids) => {
                layer.select(ids)?;
                let count = layer.selected_feature_ids().len();
                writeln!(term.output(), "Selected {} feature(s)", count)?;
            }
            Command::Hide(ids) => {
                if !ids.is_empty() {
                    layer.select(ids)?;
                }
                let active: &mut dyn MapLayer = &mut *layer;
                let outcome = plugin.trigger(ActionId::SummonGhost, Some(active), term);
                if let ActionOutcome::Hidden { ghosted } = outcome {
                    writeln!(term.output(), "{} feature(s) ghosted", ghosted)?;
                }
            }
            Command::Reveal => {
                let active: &mut dyn MapLayer = &mut *layer;
                let outcome = plugin.trigger(ActionId::BanishGhost, Some(active), term);
                match outcome {
                    ActionOutcome::Revealed { count } => {
                        writeln!(term.output(), "{} feature(s) revealed", count)?
                    }
                    ActionOutcome::Cancelled => writeln!(term.output(), "Reveal cancelled")?,
                    _ => {}
                }
            }
            Command::Restore => match plugin.manager_mut().restore_from_layer(&*layer) {
                Ok(count) => writeln!(term.output(), "Restored {} ghosted feature(s)", count)?,
                Err(e) => writeln!(term.output(), "{}", e)?,
            },
            Command::Status => {
                let report = StatusReport::collect(layer, plugin.manager())?;
                write!(term.output(), "{}", report.render())?;
            }
            Command::Actions => {
                for action in toolbar.actions() {
                    writeln!(term.output(), "{} ({})", action.title, action.icon.display())?;
                }
            }
            Command::Help => write!(term.output(), "{}", HELP)?,
            Command::Quit => break,
        }
    }

    plugin.unload(&mut toolbar);
    Ok(())
}
