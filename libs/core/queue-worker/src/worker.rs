//! The bounded consumer.
//!
//! A single intake loop pulls deliveries one at a time, checks a slot out of a
//! fixed-size pool, and spawns one processing task per delivery. When the pool is
//! saturated, intake blocks until a task returns its slot.
//!
//! Each task settles its delivery exactly once.

use crate::codec::{decode, encode};
use crate::config::WorkerConfig;
use crate::delivery::{AmqpDelivery, InboundDelivery, Settlement};
use crate::disposition::{classify, Disposition, UnclassifiedPolicy};
use crate::error::{ProcessingError, ProcessingOutcome, QueueError};
use crate::job::{JobHandler, QueueJob};
use crate::metrics::WorkerMetrics;
use crate::publisher::MessagePublisher;
use futures::{FutureExt, Stream, StreamExt};
use lapin::{
    options::{BasicConsumeOptions, BasicQosOptions},
    types::FieldTable,
    Connection,
};
use std::any::Any;
use std::marker::PhantomData;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Generic queue worker that dispatches deliveries to a job handler.
///
/// # Type Parameters
///
/// * `J` - The envelope type (must implement `QueueJob`)
/// * `H` - The handler resolving and running processors for `J`
/// * `P` - The publisher used for retry republishes
///
/// # Concurrency
///
/// At most `max_concurrent_jobs` processing tasks run at once:
///
/// ```rust,ignore
/// let config = WorkerConfig::new("notifications").with_max_concurrent_jobs(8);
/// let worker = QueueWorker::new(registry, publisher, config);
/// ```
pub struct QueueWorker<J, H, P>
where
    J: QueueJob,
    H: JobHandler<J>,
    P: MessagePublisher,
{
    pipeline: Pipeline<J, H, P>,
    config: WorkerConfig,
    /// Pool slots; one permit per running task
    concurrency_semaphore: Arc<Semaphore>,
}

impl<J, H, P> QueueWorker<J, H, P>
where
    J: QueueJob,
    H: JobHandler<J> + 'static,
    P: MessagePublisher + 'static,
{
    /// Create a new queue worker.
    pub fn new(handler: H, publisher: P, config: WorkerConfig) -> Self {
        Self::with_arc(Arc::new(handler), Arc::new(publisher), config)
    }

    /// Create a new queue worker from shared handler and publisher.
    pub fn with_arc(handler: Arc<H>, publisher: Arc<P>, config: WorkerConfig) -> Self {
        let metrics = WorkerMetrics::new(&config.queue_name, handler.name());
        let concurrency_semaphore = Arc::new(Semaphore::new(config.max_concurrent_jobs));

        Self {
            pipeline: Pipeline {
                handler,
                publisher,
                queue_name: Arc::from(config.queue_name.as_str()),
                max_retries: config.max_retries,
                policy: config.unclassified_policy,
                metrics,
                _job: PhantomData,
            },
            config,
            concurrency_semaphore,
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Consume the configured queue on a dedicated channel until shutdown.
    pub async fn consume(
        &self,
        connection: &Connection,
        shutdown: watch::Receiver<bool>,
    ) -> Result<(), QueueError> {
        let channel = connection.create_channel().await?;
        channel
            .basic_qos(self.config.prefetch_count, BasicQosOptions::default())
            .await?;

        let consumer = channel
            .basic_consume(
                &self.config.queue_name,
                &self.config.consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        let deliveries = consumer.map(|delivery| {
            delivery
                .map(AmqpDelivery::new)
                .map_err(QueueError::from)
        });

        let result = self.run(deliveries, shutdown).await;

        // Unsettled prefetched deliveries go back to the queue with the channel
        if let Err(e) = channel.close(200, "worker stopped").await {
            debug!(error = %e, "Consumer channel already closed");
        }

        result
    }

    /// Run the intake loop over a stream of deliveries.
    ///
    /// Returns when the shutdown signal fires, the stream ends, or the stream
    /// yields an error. In-flight tasks are drained for the configured grace
    /// period in every case.
    pub async fn run<S, D>(
        &self,
        deliveries: S,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), QueueError>
    where
        S: Stream<Item = Result<D, QueueError>>,
        D: InboundDelivery,
    {
        info!(
            queue = %self.config.queue_name,
            consumer_tag = %self.config.consumer_tag,
            handler = %self.pipeline.handler.name(),
            max_concurrent_jobs = %self.config.max_concurrent_jobs,
            max_retries = %self.config.max_retries,
            "Starting queue worker"
        );

        tokio::pin!(deliveries);
        let mut tasks: JoinSet<()> = JoinSet::new();
        let mut result = Ok(());

        loop {
            while let Some(joined) = tasks.try_join_next() {
                log_task_exit(joined);
            }

            let next = tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => {
                    info!("Received shutdown signal, stopping intake");
                    break;
                }
                next = deliveries.next() => next,
            };

            let delivery = match next {
                Some(Ok(delivery)) => delivery,
                Some(Err(e)) => {
                    error!(error = %e, "Delivery stream failed");
                    result = Err(e);
                    break;
                }
                None => {
                    info!("Delivery stream closed");
                    break;
                }
            };

            self.pipeline.metrics.delivery_received();

            let permit = tokio::select! {
                biased;
                _ = shutdown_requested(&mut shutdown) => None,
                permit = Arc::clone(&self.concurrency_semaphore).acquire_owned() => permit.ok(),
            };

            let Some(permit) = permit else {
                info!(
                    delivery_tag = delivery.delivery_tag(),
                    "Shutdown while waiting for a slot, requeueing delivery"
                );
                self.pipeline.settle(delivery, Settlement::Requeue).await;
                break;
            };

            let pipeline = self.pipeline.clone();
            pipeline.metrics.task_started();
            tasks.spawn(async move {
                pipeline.process(delivery).await;
                pipeline.metrics.task_finished();
                drop(permit);
            });
        }

        self.drain(&mut tasks).await;
        info!(queue = %self.config.queue_name, "Queue worker stopped");
        result
    }

    /// Wait for in-flight tasks up to the grace period, then detach the rest.
    async fn drain(&self, tasks: &mut JoinSet<()>) {
        if tasks.is_empty() {
            return;
        }

        info!(
            in_flight = tasks.len(),
            grace_secs = self.config.shutdown_grace.as_secs(),
            "Draining in-flight deliveries"
        );

        let drained = tokio::time::timeout(self.config.shutdown_grace, async {
            while let Some(joined) = tasks.join_next().await {
                log_task_exit(joined);
            }
        })
        .await;

        if drained.is_err() {
            warn!(
                remaining = tasks.len(),
                "Grace period elapsed, detaching unfinished deliveries"
            );
            tasks.detach_all();
        }
    }
}

/// Per-delivery processing shared by every task.
struct Pipeline<J, H, P> {
    handler: Arc<H>,
    publisher: Arc<P>,
    queue_name: Arc<str>,
    max_retries: u32,
    policy: UnclassifiedPolicy,
    metrics: WorkerMetrics,
    _job: PhantomData<fn() -> J>,
}

impl<J, H, P> Clone for Pipeline<J, H, P> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            publisher: Arc::clone(&self.publisher),
            queue_name: Arc::clone(&self.queue_name),
            max_retries: self.max_retries,
            policy: self.policy,
            metrics: self.metrics.clone(),
            _job: PhantomData,
        }
    }
}

impl<J, H, P> Pipeline<J, H, P>
where
    J: QueueJob,
    H: JobHandler<J>,
    P: MessagePublisher,
{
    async fn process<D: InboundDelivery>(&self, delivery: D) {
        let start = Instant::now();
        let delivery_tag = delivery.delivery_tag();

        let body = delivery.body();
        let outcome = self.attempt(body).await;
        if let Err(e) = &outcome {
            self.metrics.processing_failed(e.kind());
            warn!(
                delivery_tag,
                redelivered = delivery.redelivered(),
                error_kind = e.kind(),
                error = %e,
                "Processing failed"
            );
        }

        let disposition = classify(outcome, self.policy);
        let label = disposition.label();
        self.apply(delivery, disposition).await;

        debug!(delivery_tag, disposition = label, "Delivery settled");
        self.metrics.disposition(label, start.elapsed());
    }

    /// Decode, enforce the retry ceiling, then hand the job to the handler.
    async fn attempt(&self, body: &[u8]) -> ProcessingOutcome<J> {
        let job: J = decode(body)?;

        if job.exceeded_max_retries(self.max_retries) {
            return Err(ProcessingError::MaxRetryExceeded {
                retry_count: job.retry_count(),
                max_retries: self.max_retries,
            });
        }

        debug!(
            job_kind = %job.job_kind(),
            retry_count = job.retry_count(),
            "Dispatching job"
        );

        let result = AssertUnwindSafe(self.handler.handle(&job))
            .catch_unwind()
            .await;

        match result {
            Ok(outcome) => outcome,
            Err(panic) => Err(ProcessingError::Unclassified {
                reason: panic_message(panic.as_ref()),
                envelope: job,
            }),
        }
    }

    async fn apply<D: InboundDelivery>(&self, delivery: D, disposition: Disposition<J>) {
        let settlement = match disposition {
            Disposition::Acknowledge => Settlement::Ack,
            Disposition::DeadLetter => Settlement::Reject,
            Disposition::Requeue => Settlement::Requeue,
            Disposition::RepublishThenAck(envelope) => self.republish(&envelope).await,
        };

        self.settle(delivery, settlement).await;
    }

    /// Publish the incremented envelope. The original is acknowledged only once
    /// the broker has confirmed the replacement.
    async fn republish(&self, envelope: &J) -> Settlement {
        let published = match encode(envelope) {
            Ok(payload) => self.publisher.publish(&self.queue_name, payload).await,
            Err(e) => Err(e),
        };

        match published {
            Ok(()) => {
                self.metrics.retry_published();
                info!(
                    job_kind = %envelope.job_kind(),
                    retry_count = envelope.retry_count(),
                    "Retry envelope republished"
                );
                Settlement::Ack
            }
            Err(e) => {
                error!(
                    error = %e,
                    retry_count = envelope.retry_count(),
                    "Failed to republish retry envelope, requeueing original"
                );
                Settlement::Requeue
            }
        }
    }

    async fn settle<D: InboundDelivery>(&self, delivery: D, settlement: Settlement) {
        let delivery_tag = delivery.delivery_tag();
        if let Err(e) = delivery.settle(settlement).await {
            self.metrics.settle_failed();
            error!(
                delivery_tag,
                settlement = settlement.as_str(),
                error = %e,
                "Failed to settle delivery"
            );
        }
    }
}

/// Resolves once shutdown is signalled. A dropped sender never signals.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn log_task_exit(joined: Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        error!(error = %e, "Processing task terminated abnormally");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("processor panicked: {}", message)
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("processor panicked: {}", message)
    } else {
        "processor panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "processor panicked: boom");

        let payload: Box<dyn Any + Send> = Box::new(String::from("bad state"));
        assert_eq!(panic_message(payload.as_ref()), "processor panicked: bad state");

        let payload: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(payload.as_ref()), "processor panicked");
    }
}
