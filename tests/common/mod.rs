#![allow(dead_code)]

use ref_converter::{ConversionObserver, ConversionResult, ProgressEvent};
use serde_json::{json, Value};
use std::sync::Mutex;

/// Observer that remembers every notification it receives
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Mutex<Vec<ProgressEvent>>,
    pub completed: Mutex<Vec<ConversionResult>>,
    pub errors: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn batch_progress(&self) -> Vec<(usize, usize)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                ProgressEvent::BatchCompleted {
                    processed, total, ..
                } => Some((processed, total)),
                _ => None,
            })
            .collect()
    }

    pub fn completed(&self) -> Vec<ConversionResult> {
        self.completed.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }
}

impl ConversionObserver for RecordingObserver {
    fn on_progress(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn on_complete(&self, result: &ConversionResult) {
        self.completed.lock().unwrap().push(result.clone());
    }

    fn on_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }
}

/// A post with one strong author reference and one strong reference inside an array
pub fn post(id: &str) -> Value {
    json!({
        "_id": id,
        "_type": "post",
        "title": format!("Post {}", id),
        "author": {"_type": "reference", "_ref": "person-1"},
        "items": [
            {"_key": "a", "label": "plain"},
            {"_key": "b", "linked": {"_type": "reference", "_ref": "product-7"}}
        ]
    })
}

/// A post whose only reference is already weak
pub fn weak_post(id: &str) -> Value {
    json!({
        "_id": id,
        "_type": "post",
        "author": {"_type": "reference", "_ref": "person-2", "_weak": true}
    })
}
