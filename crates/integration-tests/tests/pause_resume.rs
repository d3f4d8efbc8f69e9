// Pause / resume semantics

mod common;

use common::{init_tracing, Spy};
use drainq_core::{AsyncDrainQueue, QueueEvent, RunState};
use std::time::Duration;
use tokio::time::sleep;

#[tokio::test(start_paused = true)]
async fn test_pause_then_resume_with_shorter_interval() {
    init_tracing();
    let queue = AsyncDrainQueue::new();
    let dequeued = Spy::attach(&queue, QueueEvent::Dequeued);

    queue.start().unwrap();
    queue.enqueue(2);
    queue.enqueue(3);
    queue.enqueue(4);
    queue.pause();

    sleep(Duration::from_millis(260)).await;
    assert_eq!(dequeued.call_count(), 0);
    queue.start().unwrap();
    queue.on_interval_change(50).unwrap();

    sleep(Duration::from_millis(60)).await;
    assert_eq!(dequeued.calls(), vec![2]);
}

#[tokio::test(start_paused = true)]
async fn test_enqueue_continues_while_paused() {
    init_tracing();
    let queue = AsyncDrainQueue::new();
    let dequeued = Spy::attach(&queue, QueueEvent::Dequeued);

    queue.start().unwrap();
    queue.enqueue(2);
    queue.enqueue(3);
    queue.enqueue(4);
    queue.pause();

    sleep(Duration::from_millis(260)).await;
    assert_eq!(dequeued.call_count(), 0);
    queue.start().unwrap();
    queue.on_interval_change(50).unwrap();
    let enqueued = Spy::attach(&queue, QueueEvent::Enqueued);
    queue.enqueue(95);
    queue.enqueue(110);

    sleep(Duration::from_millis(60)).await;
    queue.enqueue(221);
    assert_eq!(enqueued.call_count(), 3);
    assert_eq!(dequeued.call_count(), 1);
    assert_eq!(queue.print(), vec![3, 4, 95, 110, 221]);
}

#[tokio::test(start_paused = true)]
async fn test_no_dequeue_after_pause_returns() {
    init_tracing();
    let queue = AsyncDrainQueue::new();
    queue.on_interval_change(50).unwrap();
    for i in 0..10 {
        queue.enqueue(i);
    }
    let dequeued = Spy::attach(&queue, QueueEvent::Dequeued);

    queue.start().unwrap();
    sleep(Duration::from_millis(160)).await;
    assert_eq!(dequeued.calls(), vec![0, 1, 2]);

    queue.pause();
    assert_eq!(queue.run_state(), RunState::Stopped);
    sleep(Duration::from_millis(1_000)).await;
    assert_eq!(dequeued.call_count(), 3);
    assert_eq!(queue.len(), 7);
}

#[tokio::test(start_paused = true)]
async fn test_resume_does_not_catch_up() {
    init_tracing();
    let queue = AsyncDrainQueue::new();
    queue.on_interval_change(50).unwrap();
    for i in 0..10 {
        queue.enqueue(i);
    }
    let dequeued = Spy::attach(&queue, QueueEvent::Dequeued);

    queue.start().unwrap();
    sleep(Duration::from_millis(10)).await;
    queue.pause();
    sleep(Duration::from_millis(1_000)).await;

    queue.start().unwrap();
    sleep(Duration::from_millis(60)).await;
    assert_eq!(dequeued.calls(), vec![0]);
}

#[tokio::test(start_paused = true)]
async fn test_pause_when_stopped_is_noop() {
    init_tracing();
    let queue = AsyncDrainQueue::new();
    queue.enqueue(1);
    queue.pause();
    queue.pause();
    assert_eq!(queue.run_state(), RunState::Stopped);

    queue.start().unwrap();
    let dequeued = Spy::attach(&queue, QueueEvent::Dequeued);
    sleep(Duration::from_millis(260)).await;
    assert_eq!(dequeued.calls(), vec![1]);
}
