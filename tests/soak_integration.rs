//! Soak test: every bounded history holds its cap over a long run, and
//! resetting one track leaves the other untouched.

use facesignal::core::create_session;
use facesignal::types::{BBox, EyeSide, FaceDetection, FrameInput, Landmarks, Point};
use facesignal::{
    EXPRESSION_HISTORY_LEN, EYE_HISTORY_LEN, MICRO_LOG_LEN, TRACK_HISTORY_LEN,
};
use pretty_assertions::assert_eq;

const FRAMES: usize = 12_000;
const LABELS: [&str; 3] = ["Neutral", "Happy", "Neutral"];

fn detection(x: f64, i: usize) -> FaceDetection {
    // Blink every 10 frames, jitter the eyes, cycle expressions
    let open = i % 10 != 3;
    let dy = if open { 3.0 } else { 1.0 };
    let jitter = (i % 7) as f64;
    let landmarks = Landmarks {
        left_eye: Some(Point::new(x + 30.0 + jitter, 130.0)),
        right_eye: Some(Point::new(x + 70.0 + jitter, 130.0)),
        left_eye_corner: Some(Point::new(x + 20.0 + jitter, 130.0 + dy)),
        right_eye_corner: Some(Point::new(x + 80.0 + jitter, 130.0 + dy)),
        nose_tip: Some(Point::new(x + 50.0, 150.0)),
        forehead: Some(Point::new(x + 50.0, 105.0)),
        mouth_center: Some(Point::new(x + 50.0, 175.0)),
        mouth_left: Some(Point::new(x + 35.0, 175.0)),
        mouth_right: Some(Point::new(x + 65.0 + jitter, 175.0)),
        ..Landmarks::default()
    };
    FaceDetection::from_box(BBox::new(x + jitter * 0.1, 100.0, 100.0, 100.0))
        .with_landmarks(landmarks)
        .with_expression(LABELS[i % LABELS.len()], 0.7)
}

#[test]
fn test_histories_stay_bounded() {
    let mut session = create_session("soak");

    for i in 0..FRAMES {
        let t = i as f64 / 30.0;
        let frame = FrameInput::new(t, vec![detection(100.0, i), detection(400.0, i)]);
        let report = session.process_frame(&frame).unwrap();
        assert_eq!(report.faces.len(), 2);
    }

    assert_eq!(session.tracker().next_id(), 2, "identities must survive the run");

    for id in [0, 1] {
        let track = session.tracker().get(id).unwrap();
        assert_eq!(track.history_len(), TRACK_HISTORY_LEN);

        let state = session.track_state(id).unwrap();
        assert_eq!(state.blink.sample_count(EyeSide::Left), EYE_HISTORY_LEN);
        assert_eq!(state.blink.sample_count(EyeSide::Right), EYE_HISTORY_LEN);
        assert_eq!(state.micro.sample_count(), EXPRESSION_HISTORY_LEN);
        assert_eq!(state.micro.event_count(), MICRO_LOG_LEN);
        assert!(state.motion.eyes.position_count() <= 30);
        assert!(state.motion.eyes.saccade_count() <= 50);
        assert!(state.motion.eyes.fixation_count() <= 20);
        assert!(state.motion.mouth.position_count() <= 30);
        assert!(session.trajectory(id).unwrap().len() <= 20);

        // One 1/30 s closure every 10 frames is too short to count; the
        // counter must simply not run away
        assert!(state.blink.synchronized_blink_count() as usize <= FRAMES / 10);
    }

    let face = &session.snapshot().faces[&0];
    let micro = face.micro.as_ref().unwrap();
    assert_eq!(micro.total_count, MICRO_LOG_LEN);
    assert!(micro.recent.len() <= 5);
}

#[test]
fn test_reset_track_leaves_neighbour_alone() {
    let mut session = create_session("soak");
    for i in 0..300 {
        let t = i as f64 / 30.0;
        session
            .process_frame(&FrameInput::new(t, vec![detection(100.0, i), detection(400.0, i)]))
            .unwrap();
    }

    let before = session.snapshot().faces[&1].clone();
    let neighbour_samples = session.track_state(1).unwrap().micro.sample_count();

    assert!(session.reset_track(0));

    let reset = session.track_state(0).unwrap();
    assert_eq!(reset.blink.sample_count(EyeSide::Left), 0);
    assert_eq!(reset.blink.synchronized_blink_count(), 0);
    assert_eq!(reset.micro.sample_count(), 0);
    assert_eq!(reset.micro.event_count(), 0);
    assert!(!reset.quadrants.has_snapshot());
    assert_eq!(reset.motion.eyes.position_count(), 0);
    assert_eq!(session.tracker().get(0).unwrap().history_len(), 0);

    let neighbour = session.track_state(1).unwrap();
    assert_eq!(neighbour.micro.sample_count(), neighbour_samples);
    assert_eq!(session.tracker().get(1).unwrap().history_len(), TRACK_HISTORY_LEN);
    assert_eq!(session.snapshot().faces[&1], before);

    // The reset track keeps its identity on the next frame
    let report = session
        .process_frame(&FrameInput::new(10.0, vec![detection(100.0, 300), detection(400.0, 300)]))
        .unwrap();
    assert_eq!(report.faces[0].track_id, 0);
    assert!(report.new_tracks.is_empty());
    assert_eq!(session.track_state(0).unwrap().micro.sample_count(), 1);
}
