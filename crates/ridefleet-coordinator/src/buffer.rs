use ridefleet_types::{BufferEntry, Region};
use std::collections::{HashMap, HashSet, VecDeque};
use tokio::sync::Mutex;

/// Concurrent FIFO of deferred handoffs, one queue per target region.
/// Producers are `Handoff` calls that hit an unhealthy target; the consumer
/// is the drainer spawned on that region's recovery event. A per-target
/// exclusion set ensures only one drain pass runs per region at a time.
pub struct Buffer {
    queues: Mutex<HashMap<Region, VecDeque<BufferEntry>>>,
    draining: Mutex<HashSet<Region>>,
    max_per_region: u32,
}

impl Buffer {
    pub fn new(max_per_region: u32) -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            draining: Mutex::new(HashSet::new()),
            max_per_region,
        }
    }

    /// Enqueues `entry` at the back of its target's queue. Returns `false`
    /// if the target's queue is already at `max_per_region`.
    pub async fn try_enqueue(&self, entry: BufferEntry) -> bool {
        let mut queues = self.queues.lock().await;
        let queue = queues.entry(entry.target.clone()).or_default();
        if queue.len() as u32 >= self.max_per_region {
            return false;
        }
        queue.push_back(entry);
        true
    }

    pub async fn pop_front(&self, region: &Region) -> Option<BufferEntry> {
        let mut queues = self.queues.lock().await;
        queues.get_mut(region).and_then(VecDeque::pop_front)
    }

    pub async fn push_front(&self, entry: BufferEntry) {
        let mut queues = self.queues.lock().await;
        queues.entry(entry.target.clone()).or_default().push_front(entry);
    }

    pub async fn push_back(&self, entry: BufferEntry) {
        let mut queues = self.queues.lock().await;
        queues.entry(entry.target.clone()).or_default().push_back(entry);
    }

    pub async fn depth(&self, region: &Region) -> usize {
        self.queues.lock().await.get(region).map_or(0, VecDeque::len)
    }

    pub async fn depths(&self) -> HashMap<Region, usize> {
        self.queues
            .lock()
            .await
            .iter()
            .map(|(region, queue)| (region.clone(), queue.len()))
            .collect()
    }

    /// Claims the exclusive right to drain `region`. Returns `false` if
    /// another drain is already in progress for it.
    pub async fn start_draining(&self, region: &Region) -> bool {
        self.draining.lock().await.insert(region.clone())
    }

    pub async fn stop_draining(&self, region: &Region) {
        self.draining.lock().await.remove(region);
    }
}
