//! Spoken and on-screen notifications.

use std::cell::RefCell;
use std::rc::Rc;

use log::info;
use serde::{Deserialize, Serialize};

use crate::outfit::VisitOutcome;
use crate::scene::Tag;

/// Speech output collaborator.
pub trait Announcer {
    fn announce(&mut self, text: &str);
}

/// Announcer that writes to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAnnouncer;

impl Announcer for LogAnnouncer {
    fn announce(&mut self, text: &str) {
        info!("say: {text}");
    }
}

/// Announcer that keeps every line. Clones share the same record, so a host
/// can hand one clone to the simulation and read the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingAnnouncer {
    lines: Rc<RefCell<Vec<String>>>,
}

impl RecordingAnnouncer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.borrow().clone()
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce(&mut self, text: &str) {
        self.lines.borrow_mut().push(text.to_string());
    }
}

/// Lines spoken by the studio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Pick-up line; `{tag}` is replaced by the tag label.
    pub taking: String,
    pub thanks: String,
    pub another_outfit: String,
    pub bring_clothes: String,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            taking: "I'm taking {tag}".to_string(),
            thanks: "Thanks! I'll put it on now.".to_string(),
            another_outfit:
                "Hey, let's shoot photo in a next outfit! Could you please find something for me?"
                    .to_string(),
            bring_clothes: "Hello! Where are my clothes? Please, bring me some.".to_string(),
        }
    }
}

impl DialogueConfig {
    pub fn taking_line(&self, tag: Tag) -> String {
        self.taking.replace("{tag}", tag.label())
    }

    pub fn visit_line(&self, outcome: &VisitOutcome) -> &str {
        match outcome {
            VisitOutcome::Dressed { .. } => &self.thanks,
            VisitOutcome::AskForAnother => &self.another_outfit,
            VisitOutcome::AskForClothes => &self.bring_clothes,
        }
    }
}

/// The single on-screen notice.
///
/// Every notice gets an id; clearing by id only removes the notice if it is
/// still the one shown.
#[derive(Debug, Clone, Default)]
pub struct NoticeBoard {
    current: Option<(u64, String)>,
    next_id: u64,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show a notice, replacing any previous one.
    pub fn show(&mut self, text: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.current = Some((id, text.into()));
        id
    }

    /// Clear the notice if `id` is still displayed.
    pub fn clear(&mut self, id: u64) -> bool {
        match &self.current {
            Some((shown, _)) if *shown == id => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_ref().map(|(_, text)| text.as_str())
    }
}
