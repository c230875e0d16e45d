//! Wire contracts consumed by lenscout probes.
//!
//! Lenscout owns no protocol of its own. It reads the minimal
//! self-description document cooperating peers serve, see [`descriptor`].

pub mod descriptor;
