//! Room configuration handed to the media SDK.
//!
//! Adaptive streaming and dynacast stay off so media behavior does not
//! depend on the SDK's bandwidth heuristics. Auto-subscribe is on, so every
//! remote publication produces a subscription event.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

/// Peer connection timeout. Longer than the SDK default to tolerate slow
/// networks.
pub const DEFAULT_PEER_CONNECTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Public STUN servers used when the server does not provide ICE config.
pub const FALLBACK_STUN_URLS: [&str; 3] = [
    "stun:stun.l.google.com:19302",
    "stun:stun1.l.google.com:19302",
    "stun:stun2.l.google.com:19302",
];

/// One ICE server entry.
///
/// Accepts the browser `RTCIceServer` shape, where `urls` may be a single
/// string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServer {
    /// STUN/TURN urls.
    #[serde(deserialize_with = "one_or_many")]
    pub urls: Vec<String>,
    /// TURN username.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// TURN credential.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl IceServer {
    /// Server entry without credentials.
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { urls: urls.into_iter().map(Into::into).collect(), username: None, credential: None }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(url) => vec![url],
        OneOrMany::Many(urls) => urls,
    })
}

/// Which candidates ICE may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IceTransportPolicy {
    /// Host, server-reflexive, and relay candidates.
    #[default]
    All,
    /// Relay candidates only.
    Relay,
}

/// How media is bundled onto transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BundlePolicy {
    /// One transport for everything.
    #[default]
    MaxBundle,
    /// One transport per media kind.
    Balanced,
    /// One transport per track.
    MaxCompat,
}

/// Whether RTP and RTCP share a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RtcpMuxPolicy {
    /// Multiplexing required.
    #[default]
    Require,
    /// Negotiated with the peer.
    Negotiate,
}

/// Peer connection configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtcConfig {
    /// ICE servers.
    pub ice_servers: Vec<IceServer>,
    /// Candidate policy.
    pub ice_transport_policy: IceTransportPolicy,
    /// Bundle policy.
    pub bundle_policy: BundlePolicy,
    /// RTCP mux policy.
    pub rtcp_mux_policy: RtcpMuxPolicy,
}

impl RtcConfig {
    /// Config with the given servers and the fixed policies.
    pub fn with_servers(ice_servers: Vec<IceServer>) -> Self {
        Self {
            ice_servers,
            ice_transport_policy: IceTransportPolicy::All,
            bundle_policy: BundlePolicy::MaxBundle,
            rtcp_mux_policy: RtcpMuxPolicy::Require,
        }
    }

    /// Config using the public STUN fallback.
    pub fn fallback() -> Self {
        Self::with_servers(vec![IceServer::new(FALLBACK_STUN_URLS)])
    }
}

impl Default for RtcConfig {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Capture resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Target frame rate.
    pub frame_rate: u32,
}

impl Resolution {
    /// 1280x720 at 30 fps.
    pub const H720: Self = Self { width: 1280, height: 720, frame_rate: 30 };
}

/// Options applied when constructing a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomOptions {
    /// Let the SDK pause/resize video based on element visibility.
    pub adaptive_stream: bool,
    /// Let the SDK stop publishing layers nobody subscribes to.
    pub dynacast: bool,
    /// Subscribe to every remote publication automatically.
    pub auto_subscribe: bool,
    /// Default camera capture resolution.
    pub video_capture: Resolution,
    /// Peer connection configuration.
    pub rtc_config: RtcConfig,
}

impl Default for RoomOptions {
    fn default() -> Self {
        Self {
            adaptive_stream: false,
            dynacast: false,
            auto_subscribe: true,
            video_capture: Resolution::H720,
            rtc_config: RtcConfig::fallback(),
        }
    }
}

impl RoomOptions {
    /// Default options with the given ICE servers.
    ///
    /// A non-empty list is used as-is; `None` or an empty list selects the
    /// public STUN fallback.
    pub fn with_ice_servers(ice_servers: Option<Vec<IceServer>>) -> Self {
        let rtc_config = match ice_servers {
            Some(servers) if !servers.is_empty() => RtcConfig::with_servers(servers),
            _ => RtcConfig::fallback(),
        };
        Self { rtc_config, ..Self::default() }
    }
}

/// Options applied to the connect call itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Subscribe to every remote publication automatically.
    pub auto_subscribe: bool,
    /// Publish without subscribing to anything.
    pub publish_only: bool,
    /// How long to wait for the peer connection.
    pub peer_connection_timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            auto_subscribe: true,
            publish_only: false,
            peer_connection_timeout: DEFAULT_PEER_CONNECTION_TIMEOUT,
        }
    }
}
