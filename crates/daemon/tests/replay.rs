use std::io::Write;

use biosignal_daemon::{Capture, DeliveryEvent, DeviceHub, HubConfig, ReplaySummary};
use biosignal_types::{DeviceId, SignalType, NTF_ACC, NTF_EEG, NTF_IMPEDANCE};

fn eeg_packet(counter: u16) -> Vec<u8> {
    let mut bytes = vec![NTF_EEG];
    bytes.extend_from_slice(&counter.to_le_bytes());
    // 2 channels x 2 samples, 24-bit big-endian offset
    for raw in [0x80_00_01u32, 0x80_00_02, 0x7F_FF_FF, 0x80_00_00] {
        bytes.extend_from_slice(&raw.to_be_bytes()[1..]);
    }
    bytes
}

const CAPTURE: &str = r#"{
    "device": "C4:64:E3:D8:E3:2A",
    "configs": [
        {
            "signal": "eeg",
            "config": {
                "resolution_bits": 24,
                "sample_rate": 250,
                "channel_count": 2,
                "channel_mask": 3,
                "package_sample_count": 2,
                "k": 0.5
            }
        }
    ],
    "packets": []
}"#;

fn capture_with_packets(packets: Vec<Vec<u8>>) -> Capture {
    let mut capture: Capture = serde_json::from_str(CAPTURE).unwrap();
    capture.packets = packets;
    capture
}

#[tokio::test]
async fn test_replay_from_file_counts_lost_samples() {
    let capture = capture_with_packets(vec![eeg_packet(0), eeg_packet(1), eeg_packet(4)]);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", serde_json::to_string(&capture).unwrap()).unwrap();

    let capture = Capture::from_file(file.path()).unwrap();
    let (hub, events) = DeviceHub::new(HubConfig::default());
    capture.replay(&hub).await.unwrap();
    hub.shutdown().await;

    let mut summary = ReplaySummary::default();
    let mut values = Vec::new();
    for event in events.drain() {
        if let DeliveryEvent::Samples { batch, .. } = &event {
            values.extend(batch.channel_samples[0].iter().map(|s| s.value));
        }
        summary.record(&event);
    }

    let eeg = summary.get(SignalType::Eeg);
    assert_eq!(eeg.batches, 4);
    assert_eq!(eeg.samples, 5 * 2 * 2);
    assert_eq!(eeg.lost_samples, 2 * 2 * 2);
    assert_eq!(eeg.errors, 0);
    assert_eq!(&values[..2], &[0.5, -0.5]);
}

#[tokio::test]
async fn test_errors_are_attributed() {
    let capture = capture_with_packets(vec![
        vec![],
        vec![NTF_ACC, 0, 0, 1, 2, 3],
        vec![NTF_IMPEDANCE, 0, 0, 1, 2, 3],
        eeg_packet(0)[..7].to_vec(),
    ]);
    let (hub, events) = DeviceHub::new(HubConfig::default());
    capture.replay(&hub).await.unwrap();
    hub.shutdown().await;

    let mut summary = ReplaySummary::default();
    for event in events.drain() {
        summary.record(&event);
    }
    assert_eq!(summary.get(SignalType::Acc).errors, 1);
    assert_eq!(summary.get(SignalType::Eeg).errors, 1);
    assert_eq!(summary.unattributed_errors, 2);
}

#[tokio::test]
async fn test_devices_decode_independently() {
    let (hub, events) = DeviceHub::new(HubConfig::default());
    let template = capture_with_packets(vec![eeg_packet(0), eeg_packet(1)]);

    let mut first = template.clone();
    first.device = DeviceId::new("first");
    let mut second = template.clone();
    second.device = DeviceId::new("second");
    second.packets = vec![eeg_packet(7)];

    let (a, b) = tokio::join!(first.replay(&hub), second.replay(&hub));
    a.unwrap();
    b.unwrap();
    assert_eq!(hub.device_count(), 2);
    hub.shutdown().await;

    let mut first_indices = Vec::new();
    let mut second_batches = Vec::new();
    for event in events.drain() {
        if let DeliveryEvent::Samples { device, batch, .. } = event {
            let indices: Vec<u64> = batch.channel_samples[0].iter().map(|s| s.sample_index).collect();
            if device.as_str() == "first" {
                first_indices.extend(indices);
            } else {
                second_batches.push((batch.kind, indices));
            }
        }
    }
    assert_eq!(first_indices, vec![0, 1, 2, 3]);
    // Fresh stream starting at counter 7 backfills 0..=6.
    assert_eq!(second_batches.len(), 2);
    assert_eq!(second_batches[1].1, vec![14, 15]);
}

#[tokio::test]
async fn test_disconnect_at_end_of_capture() {
    let mut capture = capture_with_packets(vec![eeg_packet(0)]);
    capture.disconnect = true;
    let (hub, events) = DeviceHub::new(HubConfig::default());
    capture.replay(&hub).await.unwrap();
    assert!(!hub.is_connected(&capture.device));

    hub.on_packet(&capture.device, eeg_packet(1)).await.unwrap();
    hub.shutdown().await;

    let last = events.drain().last().unwrap();
    assert!(matches!(last, DeliveryEvent::DecodeError { signal: Some(SignalType::Eeg), .. }));
}
