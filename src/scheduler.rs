//! Batched processing of queued state updates.

use ripple_core::{Error, Host, Result};

use crate::Renderer;

impl<H: Host> Renderer<H> {
    /// Re-renders every instance with queued state updates.
    ///
    /// Work is drained in batches: instances render in the order they were first
    /// marked dirty, each at most once per batch, and updates requested while a batch
    /// runs land in the next one. Returns the number of re-renders performed.
    ///
    /// # Errors
    ///
    /// The first error raised by application code, or [`Error::UpdateLoop`] when more
    /// than [`Config::max_update_batches`](crate::Config::max_update_batches) batches
    /// were needed. Unprocessed work stays queued.
    pub fn flush(&mut self) -> Result<usize> {
        let result = self.drain_queue();
        let rendered = match &result {
            Ok(rendered) => *rendered,
            Err(_) => 0,
        };
        self.finish(result.map(|_| ()))?;
        Ok(rendered)
    }

    pub(crate) fn drain_queue(&mut self) -> Result<usize> {
        let limit = self.config.max_update_batches;
        let mut rendered = 0;
        let mut batches = 0;

        loop {
            let next = self.queue.borrow_mut().take_batch();
            let Some(batch) = next else {
                break;
            };
            if batches >= limit {
                self.queue.borrow_mut().requeue(batch);
                tracing::warn!(limit, "state updates did not settle");
                return Err(Error::UpdateLoop(limit));
            }
            batches += 1;

            let _span = tracing::trace_span!("batch", index = batches).entered();
            self.batch = Some(batch);
            let result = self.run_batch(&mut rendered);
            if let Some(batch) = self.batch.take()
                && !batch.is_empty()
            {
                self.queue.borrow_mut().requeue(batch);
            }
            result?;
        }

        if batches > 0 {
            tracing::debug!(batches, rendered, "flushed state updates");
        }
        Ok(rendered)
    }

    fn run_batch(&mut self, rendered: &mut usize) -> Result<()> {
        while let Some((instance, pending)) = self.batch.as_mut().and_then(|batch| batch.pop()) {
            if self.process_update(instance, pending)? {
                *rendered += 1;
            }
        }
        Ok(())
    }
}
