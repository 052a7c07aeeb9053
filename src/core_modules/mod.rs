pub mod blob;
pub mod connected_components;
pub mod eye;
pub mod geometry;
pub mod identity_tracker;
pub mod keyed_set;
pub mod moments;
pub mod pupil_selector;
pub mod region;
pub mod smoother;
pub mod stats;
pub mod union_find;
