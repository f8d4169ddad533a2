//! Tests that exercise the crate's public re-exports.

use std::sync::Arc;

use rstest::rstest;

use crate::{CommandRegistry, SessionOutcome, StaticReply, bootstrap_with};

use super::support::{HealthEvent, RecordingHealthReporter, TestConfigLoader};

#[rstest]
fn bootstrap_with_reexport_initialises_daemon() {
    let loader = TestConfigLoader::new();
    let reporter = Arc::new(RecordingHealthReporter::default());

    let daemon = bootstrap_with(&loader, reporter.clone(), CommandRegistry::new())
        .expect("bootstrap should succeed");

    assert_eq!(daemon.config().daemon_socket(), loader.endpoint());
    let events = reporter.events();
    assert!(events.contains(&HealthEvent::BootstrapStarting));
    assert!(events.contains(&HealthEvent::BootstrapSucceeded { commands: 3 }));
}

#[rstest]
fn daemon_session_handler_serves_registered_commands() {
    let loader = TestConfigLoader::new();
    let reporter = Arc::new(RecordingHealthReporter::default());
    let mut registry = CommandRegistry::new();
    registry
        .register(StaticReply::new("stop", "stopped\n"))
        .expect("register stop");

    let daemon = bootstrap_with(&loader, reporter, registry).expect("bootstrap should succeed");
    let stop = daemon.registry().find("stop").expect("stop registered");
    assert_eq!(stop.name(), "stop");

    let handler = daemon.session_handler();
    let mut stream = std::io::Cursor::new(b"stop\n".to_vec());
    // The reply lands in the same buffer after the request bytes.
    let outcome = handler.serve(&mut stream);
    assert!(matches!(outcome, SessionOutcome::Served { ref command } if command == "stop"));
    assert_eq!(daemon.stats().snapshot().served, 1);
}
