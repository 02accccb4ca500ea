#![allow(dead_code)]

use std::sync::Arc;

use ai_gateway_mock::MockGateway;
use forge_app::app::{Notice, NoticeKind, NoticeSink};
use forge_app::commands::Services;
use kv_store::MemoryStore;

#[derive(Default)]
pub struct NoticeSpy {
    pub notices: Vec<Notice>,
}

impl NoticeSpy {
    pub fn messages(&self) -> Vec<&str> {
        self.notices
            .iter()
            .map(|notice| notice.message.as_str())
            .collect()
    }

    pub fn last(&self) -> &Notice {
        self.notices.last().expect("at least one notice should be sent")
    }

    pub fn errors(&self) -> usize {
        self.notices
            .iter()
            .filter(|notice| notice.kind == NoticeKind::Error)
            .count()
    }
}

impl NoticeSink for NoticeSpy {
    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

pub struct Harness {
    pub gateway: Arc<MockGateway>,
    pub store: Arc<MemoryStore>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            gateway: Arc::new(MockGateway::new()),
            store: Arc::new(MemoryStore::new()),
        }
    }

    pub fn services(&self) -> Services {
        Services {
            gateway: self.gateway.clone(),
            store: self.store.clone(),
        }
    }
}
