// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Fusion Geometry
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Equilibrium geometry ingestion.
//!
//! EQDSK boundary extraction, CHEASE profile scaling, Miller surface
//! reconstruction and the boundary outline exchanged with the transport engine.

pub mod chease;
pub mod eqdsk;
pub mod miller;
pub mod outline;
