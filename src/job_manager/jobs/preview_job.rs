//! Background dispatch of the preview subprocess for the selected candidate.

use std::any::Any;
use std::sync::mpsc::Sender;

use crate::job_manager::{CancellationSignal, Job, JobMessage, JobPayload};
use crate::preview::{self, PreviewOutcome};

#[derive(Debug)]
pub struct PreviewJobResult {
    pub outcome: PreviewOutcome,
}

impl JobPayload for PreviewJobResult {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Runs the user-supplied preview command template against one candidate.
#[derive(Debug)]
pub struct PreviewJob {
    pub template: String,
    pub candidate: String,
}

impl Job for PreviewJob {
    fn run(self: Box<Self>, id: usize, sender: Sender<JobMessage>, _signal: CancellationSignal) {
        let outcome = preview::run(&self.template, &self.candidate);
        let payload = PreviewJobResult { outcome };
        let _ = sender.send(JobMessage::Custom(id, Box::new(payload)));
        let _ = sender.send(JobMessage::Finished(id, true));
    }

    fn is_silent(&self) -> bool {
        true
    }
}
