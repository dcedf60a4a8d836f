//! This crate is an implementation of the IAB Europe Transparency and Consent Framework (TCF)
//! [Consent String Specification](https://github.com/InteractiveAdvertisingBureau/GDPR-Transparency-and-Consent-Framework),
//! version 2.
//!
//! It decodes the mandatory Core String and the Disclosed Vendors segment, and answers
//! consent queries about purposes and vendors.
//!
//! NOTE: This is not an official IAB library.
//!
//! # Parsing TCF strings
//!
//! A TCF v2 consent string is made of a mandatory Core String, optionally followed by other
//! segments separated by `.` characters.
//!
//! The [`TcfEuV2`](v2/struct.TcfEuV2.html) type is used to parse consent strings.
//!
//! ```
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use std::str::FromStr;
//! use iab_tcf::v2::TcfEuV2;
//!
//! let s = "CPXuQIAPXuQIAAfKABENB-CgACAAAAAAAAYgF5wAQF5gAAAA.YAAAAAAAAAAA";
//! let tcf = TcfEuV2::from_str(s)?;
//!
//! // Types of the segments following the Core String are available
//! for segment_type in &tcf.segment_types {
//!     println!("{segment_type}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Querying consent
//!
//! The [`VendorConsents`](v2/trait.VendorConsents.html) trait exposes the questions a
//! consent string answers.
//!
//! The following example checks that a specific vendor (id 755) has the right to create a
//! personalized ads profile (purpose ID 3) for the user who submitted the provided consent string.
//!
//! ```
//! # use std::error::Error;
//! #
//! # fn main() -> Result<(), Box<dyn Error>> {
//! use iab_tcf::v2::{TcfEuV2, VendorConsents};
//!
//! let s = "CPXuQIAPXuQIAAfKABENB-CgACAAAAAAAAYgF5wAQF5gAAAA.YAAAAAAAAAAA";
//!
//! let has_user_consent = TcfEuV2::parse_str(s).map(|tcf| {
//!     // does the user consent to the vendor creating a personalized ads profile
//!     // based on their data?
//!     let personalized_ads_profile_consent = tcf.purpose_allowed(3);
//!
//!     // does the user consent to vendor Google Advertising Products to use their data?
//!     let vendor_consent = tcf.vendor_consent(755);
//!
//!     personalized_ads_profile_consent && vendor_consent
//! }).unwrap_or(false);
//!
//! assert!(has_user_consent);
//! # Ok(())
//! # }
//! ```
//!
//! # Error handling
//!
//! This crate is conservative with regard to how it handles parsing failure. If a string cannot be
//! fully decoded, then it is considered as an error.
//!
//! This is done to avoid obtaining erroneous user consent information from potentially corrupted
//! payloads. Segment types this crate does not decode are still checked for valid Base64-URL
//! content.
//!
//! # Logging
//!
//! Skipped and ignored segments are reported through [`tracing`](https://docs.rs/tracing)
//! events at the `debug` and `trace` levels. No subscriber is installed by this crate.
//!
pub(crate) mod core;
pub mod segments;
pub mod v2;
