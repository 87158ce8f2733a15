//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`RoomSessionController`]: owner of the open media session
//! - [`DetailsSource`]: credential lookup for the auto-connect flow
//! - [`Driver`]: Platform-specific I/O
//!
//! At most one join (credential lookup or connect attempt) is in flight.
//! Starting a new join drops the previous one, so only the latest attempt
//! can install a session.
//!
//! Local media operations run alongside the loop as well. Each is tagged
//! with the session generation it was issued against; results from an
//! earlier session are dropped, and leaving drops every operation still in
//! flight.

use std::{future::Future, sync::Arc};

use futures::{FutureExt, StreamExt, future::BoxFuture, stream::FuturesUnordered};
use huddle_client::MediaControl;
use huddle_core::{ConnectError, MediaConnector, SessionEvent};

use crate::{
    App, AppAction, AppConfig, AppEvent, ConnectionDetails, DetailsSource, Driver, FetchError,
    RoomSessionController,
};

/// Completion of the join in flight.
enum JoinOutcome<S> {
    Details(Result<ConnectionDetails, FetchError>),
    Session(Result<S, ConnectError>),
}

/// Completion of a local media operation.
struct MediaOutcome {
    generation: u64,
    event: AppEvent,
}

/// What woke the event loop.
enum Wake<S> {
    Join(JoinOutcome<S>),
    Media(MediaOutcome),
    Session(SessionEvent),
    Input(Option<AppEvent>),
}

/// Generic runtime that orchestrates App, session controller, and Driver.
///
/// # Type Parameters
///
/// - `D`: Platform-specific I/O driver
/// - `C`: Media SDK connector
/// - `S`: Source of connection details
pub struct Runtime<D, C, S>
where
    D: Driver,
    C: MediaConnector,
    S: DetailsSource,
{
    driver: D,
    app: App,
    controller: RoomSessionController<C>,
    details: Arc<S>,
    join: Option<BoxFuture<'static, JoinOutcome<C::Session>>>,
    media: FuturesUnordered<BoxFuture<'static, MediaOutcome>>,
}

impl<D, C, S> Runtime<D, C, S>
where
    D: Driver,
    C: MediaConnector,
    S: DetailsSource,
{
    /// Create a new runtime.
    pub fn new(driver: D, config: AppConfig, connector: C, details: S) -> Self {
        let controller = RoomSessionController::new(connector, config.connect_timeout);
        Self {
            driver,
            app: App::new(config),
            controller,
            details: Arc::new(details),
            join: None,
            media: FuturesUnordered::new(),
        }
    }

    /// Run the main event loop.
    ///
    /// This is the core orchestration loop that:
    /// 1. Waits for the join in flight, a media operation, a session event,
    ///    or driver input
    /// 2. Feeds the result to the App
    /// 3. Executes the returned actions, feeding completions back
    ///
    /// On exit the open session is disconnected.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;
        let auto_connect = self.app.config().auto_connect;
        if !(auto_connect && self.dispatch(AppEvent::AutoConnect).await?) {
            while !self.process_cycle().await? {}
        }

        self.join = None;
        self.media.clear();
        self.controller.leave().await;
        self.driver.stop();
        Ok(())
    }

    /// Process one cycle of the event loop.
    ///
    /// Returns `true` if the application should quit.
    pub async fn process_cycle(&mut self) -> Result<bool, D::Error> {
        let wake = {
            let Self { driver, controller, join, media, .. } = self;
            tokio::select! {
                biased;
                outcome = settle(join) => Wake::Join(outcome),
                Some(outcome) = media.next(), if !media.is_empty() => Wake::Media(outcome),
                event = controller.next_event() => Wake::Session(event),
                input = driver.poll_event() => Wake::Input(input?),
            }
        };

        match wake {
            Wake::Join(outcome) => {
                self.join = None;
                self.finish_join(outcome).await
            },
            Wake::Media(outcome) => self.finish_media(outcome).await,
            Wake::Session(event) => self.dispatch(AppEvent::Session(event)).await,
            Wake::Input(Some(event)) => self.dispatch(event).await,
            Wake::Input(None) => Ok(false),
        }
    }

    /// Feed one event to the App and execute the resulting actions.
    ///
    /// Returns `true` if the application should quit.
    pub async fn dispatch(&mut self, event: AppEvent) -> Result<bool, D::Error> {
        let actions = self.app.handle(event);
        self.process_actions(actions).await
    }

    async fn finish_join(&mut self, outcome: JoinOutcome<C::Session>) -> Result<bool, D::Error> {
        let event = match outcome {
            JoinOutcome::Details(Ok(details)) => AppEvent::DetailsFetched(details),
            JoinOutcome::Details(Err(error)) => AppEvent::FetchFailed(error),
            JoinOutcome::Session(Ok(session)) => {
                AppEvent::Connected(self.controller.install(session).await)
            },
            JoinOutcome::Session(Err(error)) => AppEvent::ConnectFailed(error),
        };
        self.dispatch(event).await
    }

    async fn finish_media(&mut self, outcome: MediaOutcome) -> Result<bool, D::Error> {
        if outcome.generation != self.controller.generation() || !self.controller.is_active() {
            tracing::debug!(
                generation = outcome.generation,
                current = self.controller.generation(),
                "dropped media result from a closed session"
            );
            return Ok(false);
        }
        self.dispatch(outcome.event).await
    }

    /// Process actions returned by the App.
    ///
    /// Returns `true` if should quit.
    async fn process_actions(&mut self, initial_actions: Vec<AppAction>) -> Result<bool, D::Error> {
        let mut pending_actions = initial_actions;

        while !pending_actions.is_empty() {
            let actions = std::mem::take(&mut pending_actions);

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => return Ok(true),
                    AppAction::FetchDetails => {
                        let source = Arc::clone(&self.details);
                        self.start_join(
                            async move { JoinOutcome::Details(source.fetch().await) }.boxed(),
                        );
                    },
                    AppAction::Connect(request) => {
                        let connect = self.controller.connect_future(&request);
                        self.start_join(connect.map(JoinOutcome::Session).boxed());
                    },
                    AppAction::EnableMicrophone => {
                        let op = self.controller.set_enabled_future(MediaControl::Microphone, true);
                        self.start_media(op.map(AppEvent::MicrophoneAutoEnabled));
                    },
                    AppAction::SetSourceEnabled { control, enabled } => {
                        let op = self.controller.set_enabled_future(control, enabled);
                        self.start_media(
                            op.map(move |result| AppEvent::MediaToggled { control, result }),
                        );
                    },
                    AppAction::StartAudio => {
                        let op = self.controller.start_audio_future();
                        self.start_media(op.map(AppEvent::AudioStarted));
                    },
                    AppAction::Disconnect => {
                        if self.join.take().is_some() {
                            tracing::info!("join cancelled");
                        }
                        if !self.media.is_empty() {
                            tracing::info!(count = self.media.len(), "media operations cancelled");
                            self.media.clear();
                        }
                        self.controller.leave().await;
                    },
                }
            }
        }
        Ok(false)
    }

    fn start_join(&mut self, join: BoxFuture<'static, JoinOutcome<C::Session>>) {
        if self.join.replace(join).is_some() {
            tracing::debug!("dropped superseded join");
        }
    }

    fn start_media(&mut self, op: impl Future<Output = AppEvent> + Send + 'static) {
        let generation = self.controller.generation();
        self.media.push(op.map(move |event| MediaOutcome { generation, event }).boxed());
    }

    /// Whether a join is in flight.
    pub fn has_pending_join(&self) -> bool {
        self.join.is_some()
    }

    /// Local media operations in flight.
    pub fn pending_media(&self) -> usize {
        self.media.len()
    }

    /// Get a reference to the App
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a reference to the session controller
    pub fn controller(&self) -> &RoomSessionController<C> {
        &self.controller
    }

    /// Get a reference to the driver
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Get a mutable reference to the driver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }
}

/// Wait for the join in flight. Pending forever if there is none.
///
/// Cancel-safe: the join stays in place until it completes.
async fn settle<T>(join: &mut Option<BoxFuture<'static, T>>) -> T {
    match join {
        Some(future) => future.await,
        None => std::future::pending().await,
    }
}
