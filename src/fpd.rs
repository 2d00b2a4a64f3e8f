//! First-party data byproducts and resolved outputs.
//!
//! Extraction produces three read-only byproducts per request:
//! - [`GlobalFpd`]: free-form `ext.data` objects, one per scope
//! - [`StructuredFpd`]: typed data segment lists, one per [`DataKey`]
//! - [`BidderConfigFpd`]: per-bidder override fields, decomposed per scope
//!
//! Resolution turns them into one [`ResolvedFirstPartyData`] per bidder.

use fpd_openrtb::{App, BidRequest, Data, FpdError, Site, User};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::scope::{DataKey, Scope, ScopeObject, DATA_KEY};

/// Field key to opaque JSON fragment.
pub type FieldMap = Map<String, Value>;

/// Free-form first-party data lifted out of each scope's `ext.data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalFpd {
    entries: BTreeMap<Scope, Value>,
}

impl GlobalFpd {
    pub fn new() -> Self {
        Self::default()
    }

    /// The former `ext.data` of `scope`, if it had one.
    pub fn get(&self, scope: Scope) -> Option<&Value> {
        self.entries.get(&scope)
    }

    pub fn insert(&mut self, scope: Scope, data: Value) {
        self.entries.insert(scope, data);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn scopes(&self) -> impl Iterator<Item = Scope> + '_ {
        self.entries.keys().copied()
    }

    /// Put every entry back under its scope's `ext.data`.
    ///
    /// Inverse of global extraction; scopes absent from `request` and
    /// non-object extensions are left alone.
    pub fn restore_into(&self, request: &mut BidRequest) {
        for (scope, data) in &self.entries {
            match scope {
                Scope::Site => restore_ext_data(request.site.as_mut(), data),
                Scope::App => restore_ext_data(request.app.as_mut(), data),
                Scope::User => restore_ext_data(request.user.as_mut(), data),
            }
        }
    }
}

fn restore_ext_data<T: ScopeObject>(object: Option<&mut T>, data: &Value) {
    let Some(object) = object else { return };
    let ext = object
        .ext_mut()
        .get_or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(fields) = ext {
        fields.insert(DATA_KEY.to_string(), data.clone());
    }
}

/// Structured data segment lists lifted out of content and user objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructuredFpd {
    entries: BTreeMap<DataKey, Vec<Data>>,
}

impl StructuredFpd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: DataKey) -> Option<&[Data]> {
        self.entries.get(&key).map(Vec::as_slice)
    }

    /// Store a segment list; empty lists are not recorded.
    pub fn insert(&mut self, key: DataKey, data: Vec<Data>) {
        if !data.is_empty() {
            self.entries.insert(key, data);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = DataKey> + '_ {
        self.entries.keys().copied()
    }

    /// Reattach every segment list to its container in `request`.
    pub fn restore_into(&self, request: &mut BidRequest) {
        for (key, data) in &self.entries {
            match key.scope() {
                Scope::Site => restore_data(request.site.as_mut(), data),
                Scope::App => restore_data(request.app.as_mut(), data),
                Scope::User => restore_data(request.user.as_mut(), data),
            }
        }
    }
}

fn restore_data<T: ScopeObject>(object: Option<&mut T>, data: &[Data]) {
    if let Some(object) = object {
        object.set_data(data.to_vec());
    }
}

/// One bidder's override fields, per scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BidderFpd {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<FieldMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<FieldMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<FieldMap>,
}

impl BidderFpd {
    pub fn get(&self, scope: Scope) -> Option<&FieldMap> {
        match scope {
            Scope::Site => self.site.as_ref(),
            Scope::App => self.app.as_ref(),
            Scope::User => self.user.as_ref(),
        }
    }

    fn slot_mut(&mut self, scope: Scope) -> &mut Option<FieldMap> {
        match scope {
            Scope::Site => &mut self.site,
            Scope::App => &mut self.app,
            Scope::User => &mut self.user,
        }
    }

    /// Add `fields` to `scope`; keys already present are overwritten.
    pub fn merge_scope(&mut self, scope: Scope, fields: FieldMap) {
        self.slot_mut(scope)
            .get_or_insert_with(FieldMap::new)
            .extend(fields);
    }

    /// Fold another override record in, field by field.
    pub fn merge(&mut self, other: BidderFpd) {
        for (scope, fields) in [
            (Scope::Site, other.site),
            (Scope::App, other.app),
            (Scope::User, other.user),
        ] {
            if let Some(fields) = fields {
                self.merge_scope(scope, fields);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.site.is_none() && self.app.is_none() && self.user.is_none()
    }
}

/// Bidder-specific overrides indexed by bidder name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BidderConfigFpd {
    bidders: BTreeMap<String, BidderFpd>,
}

impl BidderConfigFpd {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, bidder: &str) -> Option<&BidderFpd> {
        self.bidders.get(bidder)
    }

    pub fn contains(&self, bidder: &str) -> bool {
        self.bidders.contains_key(bidder)
    }

    /// Merge `fpd` into the record for `bidder`, creating it if needed.
    pub fn merge_bidder(&mut self, bidder: &str, fpd: BidderFpd) {
        self.bidders.entry(bidder.to_string()).or_default().merge(fpd);
    }

    pub fn remove(&mut self, bidder: &str) -> Option<BidderFpd> {
        self.bidders.remove(bidder)
    }

    pub fn bidders(&self) -> impl Iterator<Item = &str> + '_ {
        self.bidders.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.bidders.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bidders.len()
    }
}

/// One bidder's view of the request's descriptive scopes.
///
/// Each scope is an independent copy; `None` means the request had no such
/// scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFirstPartyData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<Site>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<App>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Outcome of resolving a set of bidders.
///
/// Failed bidders are absent from `resolved` and have an entry in `errors`;
/// both are ordered by bidder name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FpdResolution {
    pub resolved: BTreeMap<String, ResolvedFirstPartyData>,
    pub errors: Vec<FpdError>,
}

impl FpdResolution {
    pub fn get(&self, bidder: &str) -> Option<&ResolvedFirstPartyData> {
        self.resolved.get(bidder)
    }

    /// True when every requested bidder resolved.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_parts(self) -> (BTreeMap<String, ResolvedFirstPartyData>, Vec<FpdError>) {
        (self.resolved, self.errors)
    }
}
