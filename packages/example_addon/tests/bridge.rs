use std::cell::RefCell;
use std::rc::Rc;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use example_addon::bridge::TickBridge;
use example_addon::bridge::TickEvent;
use example_addon::napi;
use example_addon::Env;
use example_addon::Error;
use example_addon::EventLoop;
use example_addon::TickerOptions;

fn options(interval_ms: u64) -> TickerOptions {
  TickerOptions::default().with_interval(Duration::from_millis(interval_ms))
}

fn ignore(
  _: &Env,
  _: &TickEvent,
) -> napi::Result<()> {
  Ok(())
}

fn recorder() -> (
  Rc<RefCell<Vec<TickEvent>>>,
  impl Fn(&Env, &TickEvent) -> napi::Result<()>,
) {
  let events = Rc::new(RefCell::new(Vec::new()));
  let listener = {
    let events = events.clone();
    move |_: &Env, event: &TickEvent| -> napi::Result<()> {
      events.borrow_mut().push(event.clone());
      Ok(())
    }
  };
  (events, listener)
}

#[test]
fn delivers_increasing_ticks_while_running() {
  let event_loop = EventLoop::new();
  let bridge = TickBridge::new(&event_loop.env(), options(100)).unwrap();
  let (events, listener) = recorder();

  bridge.start(listener).unwrap();
  event_loop.run_for(Duration::from_millis(350)).unwrap();
  bridge.stop().unwrap();

  let events = events.borrow();
  assert!(!events.is_empty() && events.len() <= 3, "{:?}", events);
  assert!(events.iter().all(|event| event.name == "counterTick"));
  assert!(events.iter().all(|event| (1..=3).contains(&event.value)));
  assert!(events.windows(2).all(|pair| pair[0].value < pair[1].value));
}

#[test]
fn the_first_delivered_value_is_one() {
  let event_loop = EventLoop::new();
  let bridge = TickBridge::new(&event_loop.env(), options(25)).unwrap();
  let (events, listener) = recorder();

  bridge.start(listener).unwrap();
  let deadline = Instant::now() + Duration::from_secs(5);
  while events.borrow().is_empty() && Instant::now() < deadline {
    event_loop.run_for(Duration::from_millis(10)).unwrap();
  }
  bridge.stop().unwrap();

  assert_eq!(events.borrow()[0].value, 1);
}

#[test]
fn starting_twice_is_rejected() {
  let event_loop = EventLoop::new();
  let bridge = TickBridge::new(&event_loop.env(), options(50)).unwrap();

  bridge.start(ignore).unwrap();
  assert_eq!(
    bridge.start(ignore),
    Err(Error::AlreadyRunning)
  );
  assert!(bridge.is_running());
  bridge.stop().unwrap();
}

#[test]
fn stopping_an_idle_bridge_is_rejected() {
  let event_loop = EventLoop::new();
  let bridge = TickBridge::new(&event_loop.env(), options(50)).unwrap();

  assert_eq!(bridge.stop(), Err(Error::NotRunning));

  bridge.start(ignore).unwrap();
  bridge.stop().unwrap();
  assert_eq!(bridge.stop(), Err(Error::NotRunning));
  assert_eq!(bridge.current_value(), None);
}

#[test]
fn stop_returns_within_about_one_interval() {
  let event_loop = EventLoop::new();
  let bridge = TickBridge::new(&event_loop.env(), options(100)).unwrap();

  bridge.start(ignore).unwrap();
  let started = Instant::now();
  bridge.stop().unwrap();

  let elapsed = started.elapsed();
  assert!(elapsed < Duration::from_millis(250), "{:?}", elapsed);

  // The worker thread and the async handle are released
  event_loop.run().unwrap();
}

#[test]
fn nothing_is_delivered_after_stop() {
  let event_loop = EventLoop::new();
  let bridge = TickBridge::new(&event_loop.env(), options(25)).unwrap();
  let (events, listener) = recorder();

  bridge.start(listener).unwrap();
  event_loop.run_for(Duration::from_millis(120)).unwrap();
  bridge.stop().unwrap();
  let delivered = events.borrow().len();

  thread::sleep(Duration::from_millis(100));
  event_loop.run_for(Duration::from_millis(50)).unwrap();
  assert_eq!(events.borrow().len(), delivered);

  // The stopped bridge no longer keeps the loop alive
  event_loop.run().unwrap();
}

#[test]
fn ticks_pile_up_into_one_delivery_when_the_loop_is_busy() {
  let event_loop = EventLoop::new();
  let bridge = TickBridge::new(&event_loop.env(), options(25)).unwrap();
  let (events, listener) = recorder();

  bridge.start(listener).unwrap();
  thread::sleep(Duration::from_millis(200));
  event_loop.run_pending().unwrap();

  let delivered = events.borrow().clone();
  assert_eq!(delivered.len(), 1, "{:?}", delivered);
  assert!(delivered[0].value >= 2, "{:?}", delivered);
  bridge.stop().unwrap();
}

#[test]
fn every_run_counts_from_one() {
  let event_loop = EventLoop::new();
  let bridge = TickBridge::new(&event_loop.env(), options(25)).unwrap();

  for _ in 0..2 {
    let (events, listener) = recorder();
    bridge.start(listener).unwrap();
    let deadline = Instant::now() + Duration::from_secs(5);
    while events.borrow().is_empty() && Instant::now() < deadline {
      event_loop.run_for(Duration::from_millis(10)).unwrap();
    }
    bridge.stop().unwrap();
    assert_eq!(events.borrow()[0].value, 1);
  }
}

#[test]
fn bridges_run_independently() {
  let event_loop = EventLoop::new();
  let env = event_loop.env();
  let fast = TickBridge::new(&env, options(25).with_event_name("fast")).unwrap();
  let slow = TickBridge::new(&env, options(60).with_event_name("slow")).unwrap();
  let (fast_events, fast_listener) = recorder();
  let (slow_events, slow_listener) = recorder();

  fast.start(fast_listener).unwrap();
  slow.start(slow_listener).unwrap();
  event_loop.run_for(Duration::from_millis(300)).unwrap();
  fast.stop().unwrap();
  slow.stop().unwrap();

  assert!(fast_events.borrow().iter().all(|event| event.name == "fast"));
  assert!(slow_events.borrow().iter().all(|event| event.name == "slow"));
  assert!(!fast_events.borrow().is_empty());
  assert!(!slow_events.borrow().is_empty());
}

#[test]
fn a_failing_listener_does_not_stop_the_run() {
  let event_loop = EventLoop::new();
  let bridge = TickBridge::new(&event_loop.env(), options(25)).unwrap();
  let calls = Rc::new(RefCell::new(0));

  bridge
    .start({
      let calls = calls.clone();
      move |_: &Env, _: &TickEvent| -> napi::Result<()> {
        *calls.borrow_mut() += 1;
        if *calls.borrow() == 1 {
          panic!("listener blew up");
        }
        Err(napi::Error::from_reason("listener failed"))
      }
    })
    .unwrap();

  let deadline = Instant::now() + Duration::from_secs(5);
  while *calls.borrow() < 3 && Instant::now() < deadline {
    event_loop.run_for(Duration::from_millis(10)).unwrap();
  }
  assert!(bridge.is_running());
  bridge.stop().unwrap();
  assert!(*calls.borrow() >= 3);
}

#[test]
fn a_listener_may_stop_its_own_bridge() {
  let event_loop = EventLoop::new();
  let bridge = Rc::new(TickBridge::new(&event_loop.env(), options(25)).unwrap());
  let (events, record) = recorder();

  bridge
    .start({
      let bridge = Rc::downgrade(&bridge);
      move |env: &Env, event: &TickEvent| -> napi::Result<()> {
        record(env, event)?;
        if let Some(bridge) = bridge.upgrade() {
          bridge.stop()?;
        }
        Ok(())
      }
    })
    .unwrap();

  // Returns once the bridge is stopped, because nothing else keeps the loop alive
  event_loop.run().unwrap();
  assert!(!bridge.is_running());
  assert_eq!(events.borrow().len(), 1);
}

#[test]
fn dropping_a_running_bridge_stops_it() {
  let event_loop = EventLoop::new();
  let bridge = TickBridge::new(&event_loop.env(), options(25)).unwrap();
  bridge.start(ignore).unwrap();
  drop(bridge);
  event_loop.run().unwrap();
}
