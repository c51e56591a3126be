use slog::{Drain, Logger, o};
use std::sync::Mutex;
use upcore::{BitRate, Config, NotificationBridge, PdrLink, QerValues, UserplaneContext};

pub fn init() -> (UserplaneContext, Logger) {
    init_with_config(Config::default())
}

pub fn init_with_config(config: Config) -> (UserplaneContext, Logger) {
    exit_on_panic();
    let logger = init_logging();
    let context = UserplaneContext::new(&config, logger.new(o!("dev" => "upf0")));
    (context, logger)
}

fn exit_on_panic() {
    let orig_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        orig_hook(panic_info);
        std::process::exit(1);
    }));
}

fn init_logging() -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::CompactFormat::new(decorator).build();
    let drain = Mutex::new(drain).fuse();
    let drain = slog_envlogger::new(drain);
    slog::Logger::root(drain, o!())
}

pub fn test_values(qfi: u8, gbr_dl: u64, mbr_dl: u64) -> QerValues {
    QerValues {
        qfi,
        gbr: BitRate {
            dl: gbr_dl,
            ul: gbr_dl,
        },
        mbr: BitRate {
            dl: mbr_dl,
            ul: mbr_dl,
        },
    }
}

/// Test double for the notification channel: records the PDR id of every
/// callback.
#[derive(Default)]
pub struct RecordingBridge {
    pub updated: Mutex<Vec<u16>>,
    pub deleted: Mutex<Vec<u16>>,
}

impl RecordingBridge {
    pub fn updated_ids(&self) -> Vec<u16> {
        let mut ids = self.updated.lock().unwrap().clone();
        ids.sort();
        ids
    }

    pub fn deleted_ids(&self) -> Vec<u16> {
        let mut ids = self.deleted.lock().unwrap().clone();
        ids.sort();
        ids
    }
}

impl NotificationBridge for RecordingBridge {
    fn on_qer_updated(&self, pdr: &PdrLink) {
        self.updated.lock().unwrap().push(pdr.pdr_id());
    }

    fn on_qer_deleted(&self, pdr: &PdrLink) {
        self.deleted.lock().unwrap().push(pdr.pdr_id());
    }
}
