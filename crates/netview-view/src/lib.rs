//! View models, selection, positions and layout for rendered networks.

pub mod cancellation;
pub mod hierarchy;
pub mod id_map;
pub mod layout;
pub mod store;
pub mod view_model;

pub use cancellation::CancellationToken;
pub use hierarchy::{CIRCLE_PACKING, CirclePackingBuilder, HierarchyNode};
pub use id_map::IdMap;
pub use layout::{
    CircleLayout, ForceDirectedLayout, GridLayout, LayoutAlgorithm, LayoutCallback, LayoutInput,
    LayoutOutcome, LayoutRunner, LayoutStart, LayoutTicket, PositionMap,
};
pub use store::{ElementRemovalObserver, ViewModelStore};
pub use view_model::{EdgeView, NetworkView, NodeView, Position};
