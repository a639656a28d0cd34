use super::router::Availability;
use super::Brain;
use crate::types::{BrainId, Plan};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

pub const UNREACHABLE_RESPONSE: &str =
    "I can't reach any of my AI brains right now. Please check that Ollama is running or that an API key is configured.";

const FALLBACK_ORDER: [BrainId; 3] = [BrainId::Local, BrainId::CloudA, BrainId::CloudB];

/// Holds the registered brains and hands planning to whichever one is reachable.
#[derive(Default, Clone)]
pub struct BrainGateway {
    brains: HashMap<BrainId, Arc<dyn Brain>>,
}

impl BrainGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_brain(mut self, brain: Arc<dyn Brain>) -> Self {
        self.register(brain);
        self
    }

    pub fn register(&mut self, brain: Arc<dyn Brain>) {
        let id = brain.id();
        if !id.is_concrete() {
            warn!("ignoring brain registered under '{}'", id);
            return;
        }
        self.brains.insert(id, brain);
    }

    pub fn get(&self, id: BrainId) -> Option<Arc<dyn Brain>> {
        self.brains.get(&id).cloned()
    }

    pub fn registered(&self) -> Vec<BrainId> {
        FALLBACK_ORDER
            .iter()
            .copied()
            .filter(|id| self.brains.contains_key(id))
            .collect()
    }

    pub async fn probe(&self, id: BrainId) -> bool {
        match self.brains.get(&id) {
            Some(brain) => brain.is_available().await,
            None => false,
        }
    }

    /// Probes every slot concurrently. Nothing is cached between calls.
    pub async fn availability(&self) -> Availability {
        let (local, cloud_a, cloud_b) = tokio::join!(
            self.probe(BrainId::Local),
            self.probe(BrainId::CloudA),
            self.probe(BrainId::CloudB)
        );
        Availability {
            local,
            cloud_a,
            cloud_b,
        }
    }

    /// Plans with `preferred`, re-probing it first and falling through the
    /// remaining brains when it is down. Always yields a plan.
    pub async fn plan(&self, preferred: BrainId, text: &str) -> (BrainId, Plan) {
        let preferred = if preferred.is_concrete() {
            preferred
        } else {
            BrainId::Local
        };

        let candidates =
            std::iter::once(preferred).chain(FALLBACK_ORDER.into_iter().filter(|b| *b != preferred));

        for id in candidates {
            let Some(brain) = self.brains.get(&id) else {
                continue;
            };
            if !brain.is_available().await {
                continue;
            }
            if id != preferred {
                info!("brain {} unavailable, falling back to {}", preferred, id);
            }
            return (id, brain.plan(text).await);
        }

        warn!("no brain reachable for planning");
        (preferred, Plan::degraded(UNREACHABLE_RESPONSE))
    }
}
