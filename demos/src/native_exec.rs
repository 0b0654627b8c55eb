use std::thread;
use std::time::Duration;

use example_addon::EventLoop;

pub fn main() -> anyhow::Result<()> {
  let event_loop = EventLoop::new();
  let handle = event_loop.handle();

  // Set globalThis.meaning from another thread
  let worker = thread::spawn(move || {
    handle.exec(|env| {
      let mut global_this = env.get_global()?;
      global_this.set_named_property("meaning", env.create_uint32(42)?)?;
      Ok(())
    })?;

    handle.exec_detached(|env| {
      env.console_log("Hello from a detached callback");
      Ok(())
    })
  });

  while !worker.is_finished() {
    event_loop.run_for(Duration::from_millis(10))?;
  }
  worker
    .join()
    .map_err(|_| anyhow::anyhow!("worker thread panicked"))??;
  event_loop.run_pending()?;

  let env = event_loop.env();
  let meaning = env.get_global()?.get_property("meaning")?;
  env.console_log(meaning.to_string()); // "42"
  Ok(())
}
