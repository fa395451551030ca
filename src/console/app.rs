use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::MissedTickBehavior;

use crate::core::dashboard::DashboardService;
use crate::core::narration::{
    NarrationEventKind, NarrationEventReceiver, NarrationTarget, SpeechEngine,
};
use crate::core::reports::ReportSource;

use super::commands::{help_text, parse_command, Command};
use super::render::{render_control, render_dashboard, render_detail};

/// Reports are reloaded this often, whether or not anything changed.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Result of one operator command.
#[derive(Debug, Default)]
pub struct Outcome {
    pub output: String,
    pub quit: bool,
    /// Control whose progress should be echoed as narration events arrive.
    pub narrating: Option<NarrationTarget>,
}

impl Outcome {
    fn say(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            ..Self::default()
        }
    }
}

/// Drive the dashboard from `input` until the operator quits or input ends.
///
/// Refreshes, commands and narration events are handled one at a time on this task.
pub async fn run<S, E, R>(
    mut dashboard: DashboardService<S, E>,
    mut events: NarrationEventReceiver,
    input: R,
) -> anyhow::Result<()>
where
    S: ReportSource,
    E: SpeechEngine,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut refresh = tokio::time::interval(REFRESH_INTERVAL);
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut watched: Option<NarrationTarget> = None;

    println!("Type 'help' for commands.");

    loop {
        tokio::select! {
            // The first tick fires immediately, which doubles as the startup load.
            _ = refresh.tick() => {
                // Failures are already recorded on the dashboard and shown in the banner.
                let _ = dashboard.refresh().await;
                print!("{}", render_dashboard(&dashboard));
            }
            Some(event) = events.recv() => {
                let kind = event.kind.clone();
                dashboard.handle_narration_event(event);
                if let Some(target) = &watched {
                    if kind != NarrationEventKind::ErrorExpired {
                        print!("{}", render_control(&target.to_string(), &dashboard.control(target)));
                    }
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let outcome = execute_line(&mut dashboard, &line).await;
                if !outcome.output.is_empty() {
                    print!("{}", outcome.output);
                }
                if outcome.narrating.is_some() {
                    watched = outcome.narrating;
                }
                if outcome.quit {
                    break;
                }
            }
        }
    }

    if let Some(target) = dashboard.active_narration().cloned() {
        let _ = dashboard.stop(&target);
    }
    tracing::info!("Dashboard closed");
    Ok(())
}

pub async fn execute_line<S: ReportSource, E: SpeechEngine>(
    dashboard: &mut DashboardService<S, E>,
    line: &str,
) -> Outcome {
    match parse_command(line) {
        Ok(Some(command)) => execute(dashboard, command).await,
        Ok(None) => Outcome::default(),
        Err(message) => Outcome::say(format!("{}\n", message)),
    }
}

pub async fn execute<S: ReportSource, E: SpeechEngine>(
    dashboard: &mut DashboardService<S, E>,
    command: Command,
) -> Outcome {
    match command {
        Command::Refresh => {
            let _ = dashboard.refresh().await;
            Outcome::say(render_dashboard(dashboard))
        }
        Command::List => Outcome::say(render_dashboard(dashboard)),
        Command::Tab(tab) => {
            dashboard.set_tab(tab);
            Outcome::say(render_dashboard(dashboard))
        }
        Command::Filter(filter) => {
            dashboard.set_type_filter(filter);
            Outcome::say(render_dashboard(dashboard))
        }
        Command::Open(index) => {
            let Some(name) = visible_name(dashboard, index) else {
                return no_such_report(index);
            };
            match dashboard.open(&name) {
                Some(file) => Outcome::say(render_detail(file)),
                None => no_such_report(index),
            }
        }
        Command::Close => {
            dashboard.close_detail();
            Outcome::say(render_dashboard(dashboard))
        }
        Command::Read(index) => {
            let target = match index {
                None => NarrationTarget::Main,
                Some(index) => match visible_name(dashboard, index) {
                    Some(name) => NarrationTarget::Card(name),
                    None => return no_such_report(index),
                },
            };

            let mut output = String::new();
            match dashboard.narrate(target.clone()).await {
                Ok(script) => {
                    if let Some(path) = script.companion_path {
                        output.push_str(&format!("Using storytelling version {}\n", path));
                    }
                }
                Err(e) => output.push_str(&format!("{}\n", e)),
            }
            output.push_str(&render_control(
                &target.to_string(),
                &dashboard.control(&target),
            ));
            Outcome {
                output,
                narrating: Some(target),
                ..Outcome::default()
            }
        }
        Command::Pause(index) | Command::Resume(index) | Command::Stop(index) => {
            let target = match control_target(dashboard, index) {
                Ok(target) => target,
                Err(index) => return no_such_report(index),
            };
            let result = match command {
                Command::Pause(_) => dashboard.pause(&target),
                Command::Resume(_) => dashboard.resume(&target),
                _ => dashboard.stop(&target),
            };

            let mut output = String::new();
            if let Err(e) = result {
                output.push_str(&format!("{}\n", e));
            }
            output.push_str(&render_control(
                &target.to_string(),
                &dashboard.control(&target),
            ));
            Outcome::say(output)
        }
        Command::Help => Outcome::say(format!("{}\n", help_text())),
        Command::Quit => Outcome {
            quit: true,
            ..Outcome::default()
        },
    }
}

/// Name of the report at a 1-based position in the visible list.
fn visible_name<S: ReportSource, E: SpeechEngine>(
    dashboard: &DashboardService<S, E>,
    index: usize,
) -> Option<String> {
    dashboard
        .visible()
        .get(index.checked_sub(1)?)
        .map(|file| file.name.clone())
}

/// Without a number the command acts on whatever is narrating, else the main control.
fn control_target<S: ReportSource, E: SpeechEngine>(
    dashboard: &DashboardService<S, E>,
    index: Option<usize>,
) -> Result<NarrationTarget, usize> {
    match index {
        Some(index) => visible_name(dashboard, index)
            .map(NarrationTarget::Card)
            .ok_or(index),
        None => Ok(dashboard
            .active_narration()
            .cloned()
            .unwrap_or(NarrationTarget::Main)),
    }
}

fn no_such_report(index: usize) -> Outcome {
    Outcome::say(format!("No report #{} in the current list\n", index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dashboard::{DashboardSettings, Tab};
    use crate::core::narration::fake_engine::FakeSpeechEngine;
    use crate::core::narration::NarrationState;
    use crate::core::reports::{AcceptancePolicy, Clock, LoaderSettings};
    use crate::infra::reports::InMemoryReportSource;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use tokio::io::{AsyncWriteExt, BufReader};
    use tokio::sync::mpsc;

    const MANIFEST: &str = r#"{"files":[
        {"name":"20250817_email_summary_report.txt","content":"Today. Busy day."},
        {"name":"20250810_email_summary_report.txt","content":"Last week."}
    ]}"#;

    fn unloaded_dashboard(
        source: Arc<InMemoryReportSource>,
    ) -> (
        DashboardService<InMemoryReportSource, FakeSpeechEngine>,
        NarrationEventReceiver,
        FakeSpeechEngine,
    ) {
        let engine = FakeSpeechEngine::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let dashboard = DashboardService::new(
            source,
            engine.clone(),
            DashboardSettings {
                loader: LoaderSettings::new(AcceptancePolicy::Strict),
                preferred_voice: None,
                clock: Clock::Fixed(NaiveDate::from_ymd_opt(2025, 8, 17).unwrap()),
            },
            tx,
        );
        (dashboard, rx, engine)
    }

    async fn dashboard() -> (
        DashboardService<InMemoryReportSource, FakeSpeechEngine>,
        NarrationEventReceiver,
        FakeSpeechEngine,
    ) {
        let source = Arc::new(InMemoryReportSource::new().with_file("file_index.json", MANIFEST));
        let (mut dashboard, rx, engine) = unloaded_dashboard(source);
        dashboard.refresh().await.unwrap();
        (dashboard, rx, engine)
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_loads_at_startup_and_every_interval() {
        let source = Arc::new(InMemoryReportSource::new().with_file("file_index.json", MANIFEST));
        let (dashboard, rx, _engine) = unloaded_dashboard(source.clone());
        let (writer, reader) = tokio::io::duplex(64);

        let operator = async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            assert_eq!(source.requests(), vec!["file_index.json"]);

            tokio::time::sleep(REFRESH_INTERVAL - Duration::from_secs(2)).await;
            assert_eq!(source.requests().len(), 1);

            tokio::time::sleep(Duration::from_secs(2)).await;
            assert_eq!(source.requests().len(), 2);

            tokio::time::sleep(REFRESH_INTERVAL).await;
            assert_eq!(source.requests().len(), 3);

            // Closing input ends the loop like the operator pressing Ctrl-D.
            drop(writer);
        };

        let (result, ()) = tokio::join!(run(dashboard, rx, BufReader::new(reader)), operator);
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_quit_command() {
        let source = Arc::new(InMemoryReportSource::new().with_file("file_index.json", MANIFEST));
        let (dashboard, rx, _engine) = unloaded_dashboard(source.clone());
        let (mut writer, reader) = tokio::io::duplex(64);

        let operator = async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            writer.write_all(b"refresh\nquit\n").await.unwrap();
            writer
        };

        // The writer stays open, so only `quit` can end the loop.
        let (result, _writer) = tokio::join!(run(dashboard, rx, BufReader::new(reader)), operator);
        assert!(result.is_ok());
        assert_eq!(source.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_list_and_tabs() {
        let (mut dashboard, _rx, _engine) = dashboard().await;

        let today = execute_line(&mut dashboard, "list").await.output;
        assert!(today.contains("20250817_email_summary_report.txt"));
        assert!(!today.contains("20250810_email_summary_report.txt"));

        let all = execute_line(&mut dashboard, "tab all").await.output;
        assert_eq!(dashboard.tab(), Tab::All);
        assert!(all.contains("20250810_email_summary_report.txt"));
    }

    #[tokio::test]
    async fn test_open_uses_visible_numbering() {
        let (mut dashboard, _rx, _engine) = dashboard().await;
        execute_line(&mut dashboard, "all").await;

        let detail = execute_line(&mut dashboard, "open 2").await.output;
        assert!(detail.contains("Last week."));
        assert_eq!(
            dashboard.selected().map(|f| f.name.as_str()),
            Some("20250810_email_summary_report.txt")
        );

        let missing = execute_line(&mut dashboard, "open 9").await.output;
        assert!(missing.contains("No report #9"));
    }

    #[tokio::test]
    async fn test_read_pause_stop_flow() {
        let (mut dashboard, mut rx, engine) = dashboard().await;

        let outcome = execute_line(&mut dashboard, "read 1").await;
        let card = NarrationTarget::Card("20250817_email_summary_report.txt".to_string());
        assert_eq!(outcome.narrating, Some(card.clone()));
        assert!(outcome.output.contains("Preparing..."));

        while let Ok(event) = rx.try_recv() {
            dashboard.handle_narration_event(event);
        }
        assert_eq!(dashboard.narration_state(&card), NarrationState::Speaking);

        // Without a number, pause acts on the running narration.
        execute_line(&mut dashboard, "pause").await;
        assert_eq!(dashboard.narration_state(&card), NarrationState::Paused);

        execute_line(&mut dashboard, "stop").await;
        assert_eq!(dashboard.narration_state(&card), NarrationState::Idle);
        assert_eq!(engine.calls(), vec!["speak", "pause", "cancel"]);
    }

    #[tokio::test]
    async fn test_invalid_transition_is_reported() {
        let (mut dashboard, _rx, _engine) = dashboard().await;
        let output = execute_line(&mut dashboard, "resume").await.output;
        assert!(output.contains("Cannot resume"));
    }

    #[tokio::test]
    async fn test_quit_and_unknown() {
        let (mut dashboard, _rx, _engine) = dashboard().await;
        assert!(execute_line(&mut dashboard, "quit").await.quit);
        assert!(execute_line(&mut dashboard, "dance")
            .await
            .output
            .starts_with("Unknown command"));
        assert!(execute_line(&mut dashboard, "").await.output.is_empty());
    }
}
