//! On-disk formats understood by grdpost.
//!
//! Only GRD XML is supported; its reader and writer are the [`crate::traits::Parser`]
//! implementation for [`crate::types::GrdTree`].

pub mod grd;
