use crate::error::MediaError;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tracing::debug;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Where a broadcaster gets its local tracks from.
///
/// Device capture lives behind this seam; the engine only ever sees
/// ready-made local tracks.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire(
        &self,
        video: bool,
        audio: bool,
    ) -> Result<Vec<Arc<dyn TrackLocal + Send + Sync>>, MediaError>;
}

const VIDEO_FRAME_INTERVAL: Duration = Duration::from_millis(33);
const AUDIO_FRAME_INTERVAL: Duration = Duration::from_millis(20);

/// Sample-fed VP8/Opus tracks with a pacing task per track.
///
/// The payloads are filler, not decodable media: enough to carry RTP to
/// the far side so its track callbacks fire. Stands in for real capture
/// in the CLI and in tests.
#[derive(Default)]
pub struct SyntheticSource;

impl SyntheticSource {
    pub fn new() -> Self {
        Self
    }

    fn spawn_feeder(track: &Arc<TrackLocalStaticSample>, interval: Duration, payload: Vec<u8>) {
        // Weak so the feeder dies with the track instead of pinning it.
        let weak: Weak<TrackLocalStaticSample> = Arc::downgrade(track);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let Some(track) = weak.upgrade() else { break };
                let sample = Sample {
                    data: Bytes::from(payload.clone()),
                    duration: interval,
                    ..Default::default()
                };
                // Unbound tracks swallow samples; write errors are not
                // worth ending the feed over.
                if let Err(e) = track.write_sample(&sample).await {
                    debug!(error = %e, "synthetic sample dropped");
                }
            }
        });
    }
}

#[async_trait]
impl MediaSource for SyntheticSource {
    async fn acquire(
        &self,
        video: bool,
        audio: bool,
    ) -> Result<Vec<Arc<dyn TrackLocal + Send + Sync>>, MediaError> {
        let mut tracks: Vec<Arc<dyn TrackLocal + Send + Sync>> = Vec::new();

        if video {
            let track = Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_VP8.to_owned(),
                    ..Default::default()
                },
                "video".to_owned(),
                "periscope".to_owned(),
            ));
            Self::spawn_feeder(&track, VIDEO_FRAME_INTERVAL, vec![0u8; 1200]);
            tracks.push(track);
        }

        if audio {
            let track = Arc::new(TrackLocalStaticSample::new(
                RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_OPUS.to_owned(),
                    ..Default::default()
                },
                "audio".to_owned(),
                "periscope".to_owned(),
            ));
            Self::spawn_feeder(&track, AUDIO_FRAME_INTERVAL, vec![0u8; 120]);
            tracks.push(track);
        }

        if tracks.is_empty() {
            return Err(MediaError::Acquisition(
                "neither video nor audio requested".into(),
            ));
        }

        Ok(tracks)
    }
}
