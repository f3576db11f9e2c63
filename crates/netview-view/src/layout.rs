//! Layout algorithms and the asynchronous layout adapter.
//!
//! An algorithm receives the nodes and edges to arrange and reports positions
//! through a completion callback, possibly from another thread, possibly
//! never. [`LayoutRunner`] wraps each request in a [`LayoutTicket`] so results
//! that arrive after the network was removed, or after a newer request
//! superseded them, can be recognised and dropped.

use crossbeam_channel::{Receiver, Sender, unbounded};
use netview_core::{Edge, ElementId, Network, NetworkId};
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::thread;
use uuid::Uuid;

use crate::cancellation::CancellationToken;
use crate::view_model::{NetworkView, Position};

pub type PositionMap = HashMap<ElementId, Position>;
pub type LayoutCallback = Box<dyn FnOnce(PositionMap) + Send + 'static>;

/// Work handed to a [`LayoutAlgorithm`].
#[derive(Debug, Clone, Default)]
pub struct LayoutInput {
    pub nodes: Vec<ElementId>,
    pub edges: Vec<Edge>,
    /// Current positions; algorithms may use them as a starting point.
    pub positions: PositionMap,
    pub token: CancellationToken,
}

impl LayoutInput {
    /// Nodes and edges of `network`, starting from the positions in `view`.
    pub fn from_network(network: &Network, view: Option<&NetworkView>) -> Self {
        let nodes: Vec<ElementId> = network.nodes().iter().map(|n| n.id.clone()).collect();
        let positions = view
            .map(|v| {
                nodes
                    .iter()
                    .filter_map(|id| v.position(id).map(|p| (id.clone(), p)))
                    .collect()
            })
            .unwrap_or_default();
        Self {
            nodes,
            edges: network.edges().to_vec(),
            positions,
            token: CancellationToken::new(),
        }
    }

    /// Nodes of a secondary view. Synthetic views carry no topology.
    pub fn from_view(view: &NetworkView) -> Self {
        let mut nodes: Vec<ElementId> = view.node_views().map(|n| n.id.clone()).collect();
        nodes.sort();
        let positions = view.node_views().map(|n| (n.id.clone(), n.position)).collect();
        Self {
            nodes,
            edges: Vec::new(),
            positions,
            token: CancellationToken::new(),
        }
    }
}

pub trait LayoutAlgorithm: Send + Sync {
    fn name(&self) -> &'static str;

    /// Arrange `input.nodes` and hand the result to `on_complete`. The
    /// callback may run on any thread, and is not called if the work is
    /// cancelled or fails.
    fn apply(&self, input: LayoutInput, on_complete: LayoutCallback);
}

/// Row-major grid.
#[derive(Debug, Clone)]
pub struct GridLayout {
    pub spacing: f64,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self { spacing: 80.0 }
    }
}

impl LayoutAlgorithm for GridLayout {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn apply(&self, input: LayoutInput, on_complete: LayoutCallback) {
        let columns = (input.nodes.len() as f64).sqrt().ceil().max(1.0) as usize;
        let positions = input
            .nodes
            .into_iter()
            .enumerate()
            .map(|(i, id)| {
                let (row, col) = (i / columns, i % columns);
                (
                    id,
                    Position::new(col as f64 * self.spacing, row as f64 * self.spacing),
                )
            })
            .collect();
        on_complete(positions);
    }
}

/// Evenly spaced on one circle about the origin.
#[derive(Debug, Clone)]
pub struct CircleLayout {
    pub radius: f64,
}

impl Default for CircleLayout {
    fn default() -> Self {
        Self { radius: 200.0 }
    }
}

fn circle_positions(nodes: &[ElementId], radius: f64) -> PositionMap {
    let n = nodes.len();
    nodes
        .iter()
        .enumerate()
        .map(|(i, id)| {
            if n == 1 {
                return (id.clone(), Position::default());
            }
            let angle = TAU * i as f64 / n as f64;
            (
                id.clone(),
                Position::new(radius * angle.cos(), radius * angle.sin()),
            )
        })
        .collect()
}

impl LayoutAlgorithm for CircleLayout {
    fn name(&self) -> &'static str {
        "circle"
    }

    fn apply(&self, input: LayoutInput, on_complete: LayoutCallback) {
        on_complete(circle_positions(&input.nodes, self.radius));
    }
}

/// Spring embedder run on a worker thread. Checks the cancellation token
/// between iterations and drops its result when cancelled.
#[derive(Debug, Clone)]
pub struct ForceDirectedLayout {
    pub iterations: usize,
    pub spring_length: f64,
    pub repulsion: f64,
    pub damping: f64,
}

impl Default for ForceDirectedLayout {
    fn default() -> Self {
        Self {
            iterations: 200,
            spring_length: 80.0,
            repulsion: 6400.0,
            damping: 0.1,
        }
    }
}

impl ForceDirectedLayout {
    /// Runs synchronously. Returns `None` when cancelled.
    pub fn compute(&self, input: &LayoutInput) -> Option<PositionMap> {
        let n = input.nodes.len();
        let index: HashMap<&ElementId, usize> =
            input.nodes.iter().enumerate().map(|(i, id)| (id, i)).collect();

        // Start from known positions; coincident or missing ones get a circle
        // slot so repulsion has a direction to push in.
        let seed = circle_positions(&input.nodes, self.spring_length * (n as f64).sqrt());
        let mut xs = Vec::with_capacity(n);
        let mut ys = Vec::with_capacity(n);
        for id in &input.nodes {
            let p = input
                .positions
                .get(id)
                .filter(|p| p.x != 0.0 || p.y != 0.0)
                .or_else(|| seed.get(id))
                .copied()
                .unwrap_or_default();
            xs.push(p.x);
            ys.push(p.y);
        }

        let springs: Vec<(usize, usize)> = input
            .edges
            .iter()
            .filter_map(|e| Some((*index.get(&e.source)?, *index.get(&e.target)?)))
            .filter(|(a, b)| a != b)
            .collect();

        let min_distance = 1.0;
        for _ in 0..self.iterations {
            if input.token.is_cancelled() {
                return None;
            }
            let mut fx = vec![0.0f64; n];
            let mut fy = vec![0.0f64; n];

            for i in 0..n {
                for j in (i + 1)..n {
                    let dx = xs[i] - xs[j];
                    let dy = ys[i] - ys[j];
                    let dist = (dx * dx + dy * dy).sqrt().max(min_distance);
                    let force = self.repulsion / (dist * dist);
                    fx[i] += force * dx / dist;
                    fy[i] += force * dy / dist;
                    fx[j] -= force * dx / dist;
                    fy[j] -= force * dy / dist;
                }
            }

            for &(a, b) in &springs {
                let dx = xs[b] - xs[a];
                let dy = ys[b] - ys[a];
                let dist = (dx * dx + dy * dy).sqrt().max(min_distance);
                let force = (dist - self.spring_length) / dist;
                fx[a] += force * dx;
                fy[a] += force * dy;
                fx[b] -= force * dx;
                fy[b] -= force * dy;
            }

            for i in 0..n {
                xs[i] += fx[i] * self.damping;
                ys[i] += fy[i] * self.damping;
            }
        }

        Some(
            input
                .nodes
                .iter()
                .enumerate()
                .map(|(i, id)| (id.clone(), Position::new(xs[i], ys[i])))
                .collect(),
        )
    }
}

impl LayoutAlgorithm for ForceDirectedLayout {
    fn name(&self) -> &'static str {
        "force-directed"
    }

    fn apply(&self, input: LayoutInput, on_complete: LayoutCallback) {
        let layout = self.clone();
        thread::spawn(move || match layout.compute(&input) {
            Some(positions) => on_complete(positions),
            None => tracing::debug!("Force-directed layout cancelled"),
        });
    }
}

/// Identifies one layout request.
#[derive(Debug, Clone)]
pub struct LayoutTicket {
    pub id: Uuid,
    pub network: NetworkId,
    pub view_type: Option<String>,
    pub algorithm: &'static str,
    token: CancellationToken,
}

impl LayoutTicket {
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug)]
pub struct LayoutOutcome {
    pub ticket: LayoutTicket,
    pub positions: PositionMap,
}

#[derive(Debug)]
pub enum LayoutStart {
    Started(LayoutTicket),
    /// Nothing to lay out; the algorithm was not invoked.
    EmptyNetwork,
}

/// Dispatches layout requests and collects their results on a channel.
///
/// At most one request per `(network, view)` is live: starting a new one
/// cancels the previous.
pub struct LayoutRunner {
    tx: Sender<LayoutOutcome>,
    rx: Receiver<LayoutOutcome>,
    in_flight: HashMap<Uuid, LayoutTicket>,
}

impl Default for LayoutRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutRunner {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            in_flight: HashMap::new(),
        }
    }

    pub fn start(
        &mut self,
        algorithm: &dyn LayoutAlgorithm,
        network: &NetworkId,
        view_type: Option<&str>,
        mut input: LayoutInput,
    ) -> LayoutStart {
        if input.nodes.is_empty() {
            tracing::info!("Skipping {} layout of empty network {}", algorithm.name(), network);
            return LayoutStart::EmptyNetwork;
        }

        self.in_flight.retain(|_, ticket| {
            let superseded =
                &ticket.network == network && ticket.view_type.as_deref() == view_type;
            if superseded {
                ticket.token.cancel();
            }
            !superseded
        });

        let token = CancellationToken::new();
        input.token = token.clone();
        let ticket = LayoutTicket {
            id: Uuid::new_v4(),
            network: network.clone(),
            view_type: view_type.map(str::to_string),
            algorithm: algorithm.name(),
            token,
        };
        self.in_flight.insert(ticket.id, ticket.clone());

        tracing::debug!(
            "Starting {} layout {} for network {}",
            ticket.algorithm,
            ticket.id,
            network
        );
        let tx = self.tx.clone();
        let completed = ticket.clone();
        algorithm.apply(
            input,
            Box::new(move |positions| {
                let _ = tx.send(LayoutOutcome {
                    ticket: completed,
                    positions,
                });
            }),
        );
        LayoutStart::Started(ticket)
    }

    /// Cancel every request for `network`; returns how many were live.
    pub fn cancel_network(&mut self, network: &NetworkId) -> usize {
        let mut cancelled = 0;
        self.in_flight.retain(|_, ticket| {
            if &ticket.network == network {
                ticket.token.cancel();
                cancelled += 1;
                false
            } else {
                true
            }
        });
        cancelled
    }

    /// Drain results that have arrived. Cancelled results are dropped here;
    /// callers still need to check the target view exists.
    pub fn drain(&mut self) -> Vec<LayoutOutcome> {
        let mut ready = Vec::new();
        while let Ok(outcome) = self.rx.try_recv() {
            ready.extend(self.settle(outcome));
        }
        ready
    }

    /// Block until one more live result arrives or every request settles.
    pub fn wait_next(&mut self, timeout: std::time::Duration) -> Option<LayoutOutcome> {
        let deadline = std::time::Instant::now() + timeout;
        loop {
            let remaining = deadline.checked_duration_since(std::time::Instant::now())?;
            let outcome = self.rx.recv_timeout(remaining).ok()?;
            if let Some(live) = self.settle(outcome) {
                return Some(live);
            }
        }
    }

    /// A handle on the result channel, for waiting without borrowing the
    /// runner. Every received outcome must be passed to [`settle`](Self::settle).
    pub fn results(&self) -> Receiver<LayoutOutcome> {
        self.rx.clone()
    }

    /// Retire the request behind `outcome`. Returns the outcome unless it was
    /// cancelled.
    pub fn settle(&mut self, outcome: LayoutOutcome) -> Option<LayoutOutcome> {
        self.in_flight.remove(&outcome.ticket.id);
        if outcome.ticket.is_cancelled() {
            tracing::debug!("Discarding cancelled layout {}", outcome.ticket.id);
            return None;
        }
        Some(outcome)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::mpsc;
    use std::time::Duration;

    fn path(n: usize) -> Network {
        let mut network = Network::new("net");
        for i in 0..n {
            network.add_node(format!("n{i}")).unwrap();
        }
        for i in 1..n {
            network
                .add_edge(format!("e{i}"), format!("n{}", i - 1), format!("n{i}"))
                .unwrap();
        }
        network
    }

    /// Holds its callback until the test releases it.
    struct Deferred {
        pending: Mutex<Vec<(LayoutInput, LayoutCallback)>>,
    }

    impl Deferred {
        fn new() -> Self {
            Self {
                pending: Mutex::new(Vec::new()),
            }
        }

        fn release_all(&self) {
            let pending = std::mem::take(&mut *self.pending.lock().unwrap());
            for (input, callback) in pending {
                callback(circle_positions(&input.nodes, 10.0));
            }
        }
    }

    impl LayoutAlgorithm for Deferred {
        fn name(&self) -> &'static str {
            "deferred"
        }

        fn apply(&self, input: LayoutInput, on_complete: LayoutCallback) {
            self.pending.lock().unwrap().push((input, on_complete));
        }
    }

    #[test]
    fn test_grid_is_row_major() {
        let input = LayoutInput::from_network(&path(5), None);
        let (tx, rx) = mpsc::channel();
        GridLayout { spacing: 10.0 }.apply(input, Box::new(move |p| tx.send(p).unwrap()));
        let positions = rx.recv().unwrap();

        assert_eq!(positions[&ElementId::from("n0")], Position::new(0.0, 0.0));
        assert_eq!(positions[&ElementId::from("n2")], Position::new(20.0, 0.0));
        assert_eq!(positions[&ElementId::from("n3")], Position::new(0.0, 10.0));
    }

    #[test]
    fn test_circle_single_node_at_origin() {
        let positions = circle_positions(&["solo".into()], 50.0);
        assert_eq!(positions[&ElementId::from("solo")], Position::default());
    }

    #[test]
    fn test_force_directed_pulls_neighbours_closer_than_strangers() {
        let input = LayoutInput::from_network(&path(4), None);
        let positions = ForceDirectedLayout::default().compute(&input).unwrap();
        let dist = |a: &str, b: &str| {
            let (pa, pb) = (positions[&ElementId::from(a)], positions[&ElementId::from(b)]);
            ((pa.x - pb.x).powi(2) + (pa.y - pb.y).powi(2)).sqrt()
        };
        assert!(dist("n0", "n1") < dist("n0", "n3"));
        assert!(positions.values().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn test_force_directed_cancelled_yields_nothing() {
        let input = LayoutInput::from_network(&path(3), None);
        input.token.cancel();
        assert!(ForceDirectedLayout::default().compute(&input).is_none());
    }

    #[test]
    fn test_empty_network_is_not_dispatched() {
        let mut runner = LayoutRunner::new();
        let deferred = Deferred::new();
        let input = LayoutInput::from_network(&Network::new("net"), None);

        let start = runner.start(&deferred, &"net".into(), None, input);
        assert!(matches!(start, LayoutStart::EmptyNetwork));
        assert!(deferred.pending.lock().unwrap().is_empty());
    }

    #[test]
    fn test_newer_request_supersedes_older() {
        let mut runner = LayoutRunner::new();
        let deferred = Deferred::new();
        let network = path(3);

        let LayoutStart::Started(first) = runner.start(
            &deferred,
            &network.id,
            None,
            LayoutInput::from_network(&network, None),
        ) else {
            panic!("expected layout to start");
        };
        let LayoutStart::Started(second) = runner.start(
            &deferred,
            &network.id,
            None,
            LayoutInput::from_network(&network, None),
        ) else {
            panic!("expected layout to start");
        };
        assert!(first.is_cancelled());

        deferred.release_all();
        let outcomes = runner.drain();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].ticket.id, second.id);
        assert_eq!(runner.in_flight(), 0);
    }

    #[test]
    fn test_results_handle_waits_outside_the_runner() {
        let mut runner = LayoutRunner::new();
        let deferred = Deferred::new();
        let network = path(2);
        for _ in 0..2 {
            runner.start(
                &deferred,
                &network.id,
                None,
                LayoutInput::from_network(&network, None),
            );
        }
        let results = runner.results();
        deferred.release_all();

        let stale = results.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(runner.settle(stale).is_none());
        let live = results.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(runner.settle(live).is_some());
        assert_eq!(runner.in_flight(), 0);
    }

    #[test]
    fn test_cancel_network_discards_late_results() {
        let mut runner = LayoutRunner::new();
        let deferred = Deferred::new();
        let network = path(2);
        runner.start(
            &deferred,
            &network.id,
            None,
            LayoutInput::from_network(&network, None),
        );

        assert_eq!(runner.cancel_network(&network.id), 1);
        deferred.release_all();
        assert!(runner.drain().is_empty());
    }

    #[test]
    fn test_threaded_layout_reports_through_runner() {
        let mut runner = LayoutRunner::new();
        let network = path(6);
        let layout = ForceDirectedLayout {
            iterations: 20,
            ..Default::default()
        };
        runner.start(&layout, &network.id, None, LayoutInput::from_network(&network, None));

        let outcome = runner.wait_next(Duration::from_secs(10)).unwrap();
        assert_eq!(outcome.positions.len(), 6);
        assert_eq!(outcome.ticket.algorithm, "force-directed");
    }
}
