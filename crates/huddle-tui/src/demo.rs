//! In-process demo room.
//!
//! Without a native media SDK binding the client talks to the simulated
//! media server from `huddle-harness`. This module seeds it with a few
//! remote participants and keeps them busy so the room view has something
//! to show.

use std::time::Duration;

use huddle_app::ConnectionDetails;
use huddle_core::{ParticipantInfo, TrackSource};
use huddle_harness::SimMediaServer;
use tokio::task::JoinHandle;

/// Room name used by the demo server and the static details.
pub const DEMO_ROOM: &str = "demo";

const ACTIVITY_INTERVAL: Duration = Duration::from_secs(2);

fn remotes() -> [ParticipantInfo; 2] {
    [ParticipantInfo::new("PA_ann", "Ann Lee"), ParticipantInfo::new("PA_bob", "Bob Smith")]
}

/// Simulated server with the demo participants already in the room.
pub fn demo_server() -> SimMediaServer {
    remotes().into_iter().fold(SimMediaServer::new(DEMO_ROOM), SimMediaServer::with_remote)
}

/// Details the demo credential source hands out.
pub fn demo_details(participant_name: &str) -> ConnectionDetails {
    ConnectionDetails {
        server_url: "ws://localhost:7880".into(),
        room_name: DEMO_ROOM.into(),
        participant_token: "demo-token".into(),
        participant_name: participant_name.into(),
        ice_servers: None,
    }
}

/// Drive scripted activity on `server` until the task is aborted.
///
/// Every new session gets Ann's camera and microphone and Bob's microphone,
/// then the active speaker rotates between them.
pub fn spawn_activity(server: SimMediaServer) -> JoinHandle<()> {
    tokio::spawn(async move {
        let [ann, bob] = remotes();
        let mut interval = tokio::time::interval(ACTIVITY_INTERVAL);
        let mut seeded = 0;
        let mut step = 0usize;

        loop {
            interval.tick().await;
            if server.open_sessions() == 0 {
                continue;
            }

            let opened = server.sessions_opened();
            if opened != seeded {
                seeded = opened;
                server.publish(&ann, TrackSource::Camera);
                server.publish(&ann, TrackSource::Microphone);
                server.publish(&bob, TrackSource::Microphone);
                tracing::debug!(session = opened, "demo tracks published");
                continue;
            }

            step = step.wrapping_add(1);
            let speaker = if step % 2 == 0 { &ann.id } else { &bob.id };
            server.speakers(std::slice::from_ref(speaker));
            server.set_muted(&bob.id, TrackSource::Microphone, step % 5 == 0);
        }
    })
}
