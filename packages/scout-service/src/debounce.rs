use std::time::Duration;

use tokio::{
	sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
	task::JoinHandle,
	time::{self, Instant},
};

/// Trailing-edge debouncer. Each pushed value replaces the pending one and restarts the quiet
/// period; the last value is emitted once the period elapses with no further pushes.
///
/// Dropping the debouncer stops it and discards any pending value.
pub struct Debouncer<T> {
	input: UnboundedSender<Input<T>>,
	task: JoinHandle<()>,
}
impl<T> Debouncer<T>
where
	T: Send + 'static,
{
	/// Must be called inside a tokio runtime.
	pub fn new(delay: Duration) -> (Self, UnboundedReceiver<T>) {
		let (input, input_rx) = mpsc::unbounded_channel();
		let (output, output_rx) = mpsc::unbounded_channel();
		let task = tokio::spawn(run(delay, input_rx, output));

		(Self { input, task }, output_rx)
	}

	/// Returns `false` once the debouncer has stopped.
	pub fn push(&self, value: T) -> bool {
		self.input.send(Input::Value(value)).is_ok()
	}

	/// Discards the pending value, if any. Values pushed afterwards debounce as usual.
	pub fn cancel(&self) -> bool {
		self.input.send(Input::Cancel).is_ok()
	}

	pub fn shutdown(self) {}
}
impl<T> Drop for Debouncer<T> {
	fn drop(&mut self) {
		self.task.abort();
	}
}

enum Input<T> {
	Value(T),
	Cancel,
}

async fn run<T>(
	delay: Duration,
	mut input: UnboundedReceiver<Input<T>>,
	output: UnboundedSender<T>,
) {
	let mut pending = None;
	let sleep = time::sleep(delay);

	tokio::pin!(sleep);

	loop {
		tokio::select! {
			message = input.recv() => match message {
				Some(Input::Value(value)) => {
					pending = Some(value);

					sleep.as_mut().reset(Instant::now() + delay);
				},
				Some(Input::Cancel) => pending = None,
				None => return,
			},
			() = &mut sleep, if pending.is_some() => {
				if let Some(value) = pending.take()
					&& output.send(value).is_err()
				{
					return;
				}
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test(start_paused = true)]
	async fn emits_only_the_last_value_after_quiet_period() {
		let delay = Duration::from_millis(300);
		let (debouncer, mut rx) = Debouncer::new(delay);
		let started = Instant::now();

		for value in 1..=5 {
			assert!(debouncer.push(value));

			time::sleep(Duration::from_millis(100)).await;
		}

		let emitted = rx.recv().await.expect("Expected an emission.");

		assert_eq!(emitted, 5);
		assert_eq!(started.elapsed(), Duration::from_millis(400 + 300));

		time::sleep(Duration::from_secs(5)).await;

		assert!(rx.try_recv().is_err());
	}

	#[tokio::test(start_paused = true)]
	async fn separate_bursts_emit_separately() {
		let (debouncer, mut rx) = Debouncer::new(Duration::from_millis(300));

		debouncer.push("a");
		time::sleep(Duration::from_millis(500)).await;
		debouncer.push("b");

		assert_eq!(rx.recv().await, Some("a"));
		assert_eq!(rx.recv().await, Some("b"));
	}

	#[tokio::test(start_paused = true)]
	async fn cancel_discards_pending_value_only() {
		let (debouncer, mut rx) = Debouncer::new(Duration::from_millis(300));

		debouncer.push(1);
		time::sleep(Duration::from_millis(100)).await;

		assert!(debouncer.cancel());

		time::sleep(Duration::from_secs(1)).await;

		assert!(rx.try_recv().is_err());

		debouncer.push(2);

		assert_eq!(rx.recv().await, Some(2));
	}

	#[tokio::test(start_paused = true)]
	async fn dropping_discards_pending_value() {
		let (debouncer, mut rx) = Debouncer::new(Duration::from_millis(300));

		debouncer.push(1);
		drop(debouncer);

		time::sleep(Duration::from_secs(1)).await;

		assert_eq!(rx.recv().await, None);
	}
}
