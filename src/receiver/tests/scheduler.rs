use crate::receiver::{PlaybackDecision, PlaybackScheduler};

#[test]
fn test_start_above_threshold() {
    let mut scheduler = PlaybackScheduler::new(100, 20);

    assert_eq!(scheduler.tick(0, 25), PlaybackDecision::Start);
    assert!(scheduler.is_playing());
    assert_eq!(scheduler.starts(), 1);
}

#[test]
fn test_hold_at_threshold() {
    let mut scheduler = PlaybackScheduler::new(100, 20);

    assert_eq!(scheduler.tick(0, 20), PlaybackDecision::Hold);
    assert!(!scheduler.is_playing());
    assert_eq!(scheduler.tick(0, 21), PlaybackDecision::Start);
}

#[test]
fn test_stop_when_reader_catches_writer() {
    let mut scheduler = PlaybackScheduler::new(100, 20);

    scheduler.tick(0, 25);
    assert_eq!(scheduler.tick(10, 25), PlaybackDecision::Hold);
    assert_eq!(scheduler.tick(25, 25), PlaybackDecision::Stop);
    assert!(!scheduler.is_playing());
    assert_eq!(scheduler.underruns(), 1);
}

#[test]
fn test_hysteresis() {
    let mut scheduler = PlaybackScheduler::new(100, 20);

    scheduler.tick(0, 25);
    // Buffered drops below the start threshold but the reader is still behind
    assert_eq!(scheduler.tick(20, 25), PlaybackDecision::Hold);
    assert!(scheduler.is_playing());

    scheduler.tick(25, 25);
    // Stopped with 5 buffered: no restart until above the threshold again
    assert_eq!(scheduler.tick(25, 30), PlaybackDecision::Hold);
    assert_eq!(scheduler.tick(25, 46), PlaybackDecision::Start);
}

#[test]
fn test_loop_count_per_lap() {
    let mut scheduler = PlaybackScheduler::new(100, 20);

    scheduler.tick(0, 150);
    scheduler.tick(60, 150);
    assert_eq!(scheduler.loop_count(), 0);

    scheduler.tick(90, 150);
    scheduler.tick(30, 150);
    assert_eq!(scheduler.loop_count(), 1);
    assert_eq!(scheduler.read_position(), 130);

    scheduler.tick(45, 150);
    assert_eq!(scheduler.loop_count(), 1);
    assert_eq!(scheduler.read_position(), 145);
    assert_eq!(scheduler.buffered(150), 5);
}

#[test]
fn test_equal_cursor_is_not_a_lap() {
    let mut scheduler = PlaybackScheduler::new(100, 20);

    scheduler.tick(40, 50);
    scheduler.tick(40, 50);

    assert_eq!(scheduler.loop_count(), 0);
    assert_eq!(scheduler.read_position(), 40);
}

#[test]
fn test_reader_past_writer_while_stopped() {
    let mut scheduler = PlaybackScheduler::new(100, 20);

    assert_eq!(scheduler.tick(50, 10), PlaybackDecision::Hold);
    assert_eq!(scheduler.buffered(10), 0);
}
