//! Integration tests for identity tracking through a session
//!
//! - IoU matching keeps identity across frames
//! - Unmatched tracks drop immediately, ids are never reused
//! - Contract violations reject the whole frame

use facesignal::core::{create_session, iou, IdentityTracker};
use facesignal::types::{BBox, FaceDetection, FrameInput, Landmarks, Point, SizeCategory};
use facesignal::FrameError;
use pretty_assertions::assert_eq;

fn face(x: f64, y: f64) -> FaceDetection {
    FaceDetection::from_box(BBox::new(x, y, 50.0, 50.0))
}

// =============================================================================
// IoU MATCHING
// =============================================================================

#[test]
fn test_overlapping_box_keeps_identity() {
    let a = BBox::new(100.0, 100.0, 50.0, 50.0);
    let b = BBox::new(105.0, 105.0, 50.0, 50.0);
    let overlap = iou(&a, &b);
    assert!((overlap - 2025.0 / 2975.0).abs() < 1e-9, "IoU was {}", overlap);
    assert!(overlap > facesignal::TRACK_MIN_IOU);

    let mut session = create_session("cam0");
    let first = session.process_frame(&FrameInput::new(0.0, vec![face(100.0, 100.0)])).unwrap();
    let second = session.process_frame(&FrameInput::new(0.1, vec![face(105.0, 105.0)])).unwrap();

    assert_eq!(first.faces[0].track_id, second.faces[0].track_id);
    assert!(second.new_tracks.is_empty());
    assert!(second.dropped_tracks.is_empty());
}

#[test]
fn test_face_walking_across_frame() {
    let mut session = create_session("cam0");
    for i in 0..50 {
        let t = i as f64 / 30.0;
        let report = session
            .process_frame(&FrameInput::new(t, vec![face(100.0 + i as f64 * 5.0, 100.0)]))
            .unwrap();
        assert_eq!(report.faces[0].track_id, 0, "frame {}", i);
    }
    // 5 px per 1/30 s
    let speed = session.tracker().average_speed(0).unwrap();
    assert!((speed - 150.0).abs() < 1e-6, "speed {}", speed);
    assert_eq!(session.stats().unique_faces_seen, 1);
}

#[test]
fn test_jump_creates_new_identity() {
    let mut session = create_session("cam0");
    session.process_frame(&FrameInput::new(0.0, vec![face(100.0, 100.0)])).unwrap();
    let report = session.process_frame(&FrameInput::new(0.1, vec![face(400.0, 400.0)])).unwrap();

    assert_eq!(report.new_tracks, vec![1]);
    assert_eq!(report.dropped_tracks, vec![0]);
    assert_eq!(report.faces[0].track_id, 1);
}

// =============================================================================
// NO GRACE PERIOD, NO ID REUSE
// =============================================================================

#[test]
fn test_occlusion_drops_track_for_good() {
    let mut session = create_session("cam0");
    session.process_frame(&FrameInput::new(0.0, vec![face(100.0, 100.0)])).unwrap();
    let gap = session.process_frame(&FrameInput::new(0.1, Vec::new())).unwrap();
    assert_eq!(gap.dropped_tracks, vec![0]);
    assert!(gap.faces.is_empty());

    let back = session.process_frame(&FrameInput::new(0.2, vec![face(100.0, 100.0)])).unwrap();
    assert_eq!(back.faces[0].track_id, 1);
    assert!(session.track_state(0).is_none());
}

#[test]
fn test_two_faces_cannot_share_a_track() {
    let mut tracker = IdentityTracker::new();
    tracker.update(&[BBox::new(100.0, 100.0, 50.0, 50.0)], 0.0).unwrap();
    let update = tracker
        .update(
            &[BBox::new(102.0, 100.0, 50.0, 50.0), BBox::new(98.0, 100.0, 50.0, 50.0)],
            0.1,
        )
        .unwrap();
    assert_eq!(update.assignments, vec![0, 1]);
    assert_eq!(update.new_tracks, vec![1]);
}

// =============================================================================
// CONTRACT VIOLATIONS
// =============================================================================

#[test]
fn test_negative_box_rejected_atomically() {
    let mut session = create_session("cam0");
    session.process_frame(&FrameInput::new(0.0, vec![face(100.0, 100.0)])).unwrap();

    let frame = FrameInput::new(
        0.1,
        vec![face(100.0, 100.0), FaceDetection::from_box(BBox::new(0.0, 0.0, 10.0, -1.0))],
    );
    let err = session.process_frame(&frame).unwrap_err();
    assert_eq!(err, FrameError::NegativeSize { index: 1, w: 10.0, h: -1.0 });

    assert_eq!(session.tracker().get(0).unwrap().history_len(), 1);
    assert_eq!(session.tracker().next_id(), 1);
    assert_eq!(session.snapshot().frame_count, 1);
}

#[test]
fn test_time_must_not_go_backwards() {
    let mut session = create_session("cam0");
    session.process_frame(&FrameInput::new(1.0, vec![face(0.0, 0.0)])).unwrap();
    let err = session.process_frame(&FrameInput::new(0.5, vec![face(0.0, 0.0)])).unwrap_err();
    assert!(matches!(err, FrameError::NonMonotonicTimestamp { .. }));

    // Equal timestamps are allowed
    assert!(session.process_frame(&FrameInput::new(1.0, vec![face(0.0, 0.0)])).is_ok());
}

// =============================================================================
// DEGRADED INPUT
// =============================================================================

#[test]
fn test_partial_landmarks_never_fail() {
    let mut session = create_session("cam0");
    let lm = Landmarks {
        left_eye: Some(Point::new(120.0, 115.0)),
        nose_tip: Some(Point::new(125.0, 125.0)),
        ..Landmarks::default()
    };
    let report = session
        .process_frame(&FrameInput::new(0.0, vec![face(100.0, 100.0).with_landmarks(lm)]))
        .unwrap();
    let f = &report.faces[0];
    assert!(f.eyes.is_none());
    assert_eq!(f.geometry.head_pose.yaw, 0.0);
    assert_eq!(f.geometry.head_pose.orientation, "Frontal");
    assert!(f.mouth.is_none());
}

#[test]
fn test_placement_with_frame_size() {
    let mut session = create_session("cam0");
    let frame = FrameInput::new(0.0, vec![FaceDetection::from_box(BBox::new(270.0, 190.0, 100.0, 100.0))])
        .with_frame_size(640.0, 480.0);
    let report = session.process_frame(&frame).unwrap();
    let placement = report.faces[0].placement;
    // 10000 / 307200 is about 3.3% of the frame
    assert_eq!(placement.size, SizeCategory::Medium);
    let pos = placement.position_pct.unwrap();
    assert!((pos.x - 50.0).abs() < 1e-9);
    assert!((pos.y - 50.0).abs() < 1e-9);
}
