//! Session-loss detection and the one-shot confirmation dialog.
//!
//! # Design
//! When the login gateway redirects an API call, the browser blocks the
//! redirect and the call surfaces as a transport failure with status 0.
//! `SessionMonitor` reacts by expiring the session cookies and asking the
//! host to show a single confirmation dialog. The monitor is shared by every
//! facade that talks to the same page, so the dialog is raised at most once
//! until the page is reloaded and a new monitor is created.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use url::form_urlencoded;

use crate::config::{BuildMode, SessionConfig};

/// Expiry stamp written into cleared cookies.
pub const EXPIRED: &str = "Thu, 01 Jan 1970 00:00:01 GMT";

/// `document.cookie` assignment that expires `name`.
pub fn expired_cookie(name: &str) -> String {
    format!("{name}=; expires={EXPIRED};")
}

/// The dialog shown on session loss. Acknowledging it navigates to `redirect`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLostDialog {
    pub title: String,
    pub content: String,
    pub redirect: String,
}

/// Page-side effects the monitor needs from its host.
pub trait SessionHost: Send + Sync {
    /// Write one `document.cookie` style assignment.
    fn set_cookie(&self, cookie: &str);

    /// Detach the page's global error reporter.
    fn disable_error_reporting(&self);

    /// Full URL of the current page.
    fn current_location(&self) -> String;

    /// Show a blocking confirmation; on acknowledgement navigate to `dialog.redirect`.
    fn confirm(&self, dialog: SessionLostDialog);
}

/// Watches transport failures for the session-loss signal.
///
/// Holds the confirming flag for one page lifetime. The first status-0
/// failure expires the session cookies, detaches error reporting and raises
/// the dialog; later ones only expire the cookies again.
pub struct SessionMonitor {
    config: SessionConfig,
    host: Arc<dyn SessionHost>,
    confirming: AtomicBool,
}

impl SessionMonitor {
    pub fn new(config: SessionConfig, host: Arc<dyn SessionHost>) -> Self {
        Self {
            config,
            host,
            confirming: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// True once the dialog has been raised.
    pub fn is_confirming(&self) -> bool {
        self.confirming.load(Ordering::SeqCst)
    }

    /// React to a transport failure. Only status 0 counts as session loss.
    pub fn on_transport_failure(&self, status: u16) {
        if status != 0 {
            return;
        }
        warn!("request cancelled with status 0, treating session as lost");
        for name in &self.config.cookie_names {
            self.host.set_cookie(&expired_cookie(name));
        }
        self.confirm_session_lost();
    }

    /// Raise the dialog unless it has already been raised.
    pub fn confirm_session_lost(&self) {
        if self
            .confirming
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        // Errors caused by the expired session would each open their own dialog.
        self.host.disable_error_reporting();

        let dialog = SessionLostDialog {
            title: self.config.dialog_title.clone(),
            content: self.config.dialog_content.clone(),
            redirect: self.redirect_target(),
        };
        info!("session lost, redirect target {}", dialog.redirect);
        self.host.confirm(dialog);
    }

    fn redirect_target(&self) -> String {
        match self.config.build_mode {
            BuildMode::Development => self.config.development_landing.clone(),
            BuildMode::Production => {
                let location: String =
                    form_urlencoded::byte_serialize(self.host.current_location().as_bytes()).collect();
                format!("{}?service={location}", self.config.login_path)
            }
        }
    }
}

impl std::fmt::Debug for SessionMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionMonitor")
            .field("config", &self.config)
            .field("confirming", &self.is_confirming())
            .finish_non_exhaustive()
    }
}
