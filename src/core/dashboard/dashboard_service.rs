use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Local};

use crate::core::narration::{
    CompanionLocator, NarrationError, NarrationEvent, NarrationEventSender, NarrationScript,
    NarrationTarget, Narrator, SpeechEngine, TriggerControl,
};
use crate::core::reports::{
    Clock, FileDescriptor, LoaderError, LoaderSettings, ReportLoader, ReportSource,
};

use super::dashboard_models::{DashboardStats, Tab, TypeFilter};
use super::filters::{apply_filters, compute_stats};

pub struct DashboardSettings {
    pub loader: LoaderSettings,
    pub preferred_voice: Option<String>,
    pub clock: Clock,
}

/// Owns the working set, the list filters, the detail selection and the narrator.
///
/// Everything mutates through `&mut self`, so the caller's event loop is the only
/// writer and a refresh publishes its result in one assignment.
pub struct DashboardService<S: ReportSource, E: SpeechEngine> {
    loader: ReportLoader<S>,
    companions: CompanionLocator<S>,
    narrator: Narrator<E>,
    clock: Clock,
    source_label: String,
    files: Vec<FileDescriptor>,
    tab: Tab,
    type_filter: TypeFilter,
    selected: Option<String>,
    load_error: Option<String>,
    last_refreshed: Option<DateTime<Local>>,
}

impl<S: ReportSource, E: SpeechEngine> DashboardService<S, E> {
    pub fn new(
        source: Arc<S>,
        engine: E,
        settings: DashboardSettings,
        events: NarrationEventSender,
    ) -> Self {
        Self {
            source_label: source.describe(),
            loader: ReportLoader::new(Arc::clone(&source), settings.loader, settings.clock),
            companions: CompanionLocator::new(source),
            narrator: Narrator::new(engine, settings.preferred_voice, events),
            clock: settings.clock,
            files: Vec::new(),
            tab: Tab::default(),
            type_filter: TypeFilter::default(),
            selected: None,
            load_error: None,
            last_refreshed: None,
        }
    }

    /// Reload the working set from scratch and replace it wholesale.
    ///
    /// On failure the list is emptied and the error kept for display.
    pub async fn refresh(&mut self) -> Result<usize, LoaderError> {
        match self.loader.load().await {
            Ok(files) => {
                let count = files.len();
                self.files = files;
                self.load_error = None;
                self.last_refreshed = Some(Local::now());

                if let Some(name) = &self.selected {
                    if !self.files.iter().any(|f| &f.name == name) {
                        self.selected = None;
                    }
                }
                let names: HashSet<&str> = self.files.iter().map(|f| f.name.as_str()).collect();
                self.narrator.retain_cards(&names);

                tracing::info!(count, "Dashboard refreshed");
                Ok(count)
            }
            Err(err) => {
                tracing::error!(error = %err, "Dashboard refresh failed");
                self.files.clear();
                self.selected = None;
                self.load_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    #[cfg(test)]
    pub fn files(&self) -> &[FileDescriptor] {
        &self.files
    }

    /// Reports passing both the tab and the type filter, newest first.
    pub fn visible(&self) -> Vec<&FileDescriptor> {
        apply_filters(&self.files, self.tab, self.type_filter, self.clock.today())
    }

    pub fn stats(&self) -> DashboardStats {
        compute_stats(&self.files, self.clock.today())
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn type_filter(&self) -> TypeFilter {
        self.type_filter
    }

    pub fn set_type_filter(&mut self, filter: TypeFilter) {
        self.type_filter = filter;
    }

    pub fn source_label(&self) -> &str {
        &self.source_label
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn last_refreshed(&self) -> Option<DateTime<Local>> {
        self.last_refreshed
    }

    /// Open the detail view for a report in the working set.
    pub fn open(&mut self, name: &str) -> Option<&FileDescriptor> {
        let file = self.files.iter().find(|f| f.name == name)?;
        self.selected = Some(file.name.clone());
        Some(file)
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&FileDescriptor> {
        let name = self.selected.as_ref()?;
        self.files.iter().find(|f| &f.name == name)
    }

    pub fn control(&self, target: &NarrationTarget) -> TriggerControl {
        self.narrator.control(target)
    }

    #[cfg(test)]
    pub fn narration_state(
        &self,
        target: &NarrationTarget,
    ) -> crate::core::narration::NarrationState {
        self.narrator.state(target)
    }

    pub fn active_narration(&self) -> Option<&NarrationTarget> {
        self.narrator.active_target()
    }

    /// Start reading a report aloud on the given control.
    ///
    /// A card reads its own report; the main control reads the open report, or the
    /// first visible one. Any narration already running is cancelled first.
    pub async fn narrate(
        &mut self,
        target: NarrationTarget,
    ) -> Result<NarrationScript, NarrationError> {
        let descriptor = self
            .narration_subject(&target)
            .cloned()
            .ok_or(NarrationError::NothingToRead)?;

        let session = self.narrator.begin(target.clone());
        let script = self.companions.narration_script(&descriptor).await;
        match &script.companion_path {
            Some(path) => tracing::info!(%target, companion = %path, "Narrating storytelling version"),
            None => tracing::info!(%target, report = %descriptor.name, "Narrating report content"),
        }

        self.narrator.speak(session, &script.text).await?;
        Ok(script)
    }

    pub fn pause(&mut self, target: &NarrationTarget) -> Result<(), NarrationError> {
        self.narrator.pause(target)
    }

    pub fn resume(&mut self, target: &NarrationTarget) -> Result<(), NarrationError> {
        self.narrator.resume(target)
    }

    pub fn stop(&mut self, target: &NarrationTarget) -> Result<(), NarrationError> {
        self.narrator.stop(target)
    }

    pub fn handle_narration_event(&mut self, event: NarrationEvent) {
        self.narrator.handle_event(event);
    }

    fn narration_subject(&self, target: &NarrationTarget) -> Option<&FileDescriptor> {
        match target {
            NarrationTarget::Main => self.selected().or_else(|| self.visible().first().copied()),
            NarrationTarget::Card(name) => self.files.iter().find(|f| &f.name == name),
        }
    }
}
