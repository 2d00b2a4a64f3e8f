//! Request wrapper with decomposed extensions and recomposition.
//!
//! Extraction edits extension JSON key by key. Rather than re-parsing
//! `site.ext` and friends for every edit, the wrapper decomposes each
//! extension once into a field map, tracks whether it changed, and writes
//! changed maps back into the wire request on [`RequestWrapper::rebuild_request`].
//!
//! Recomposition is idempotent: clean maps are never written back, and an
//! emptied extension becomes absent rather than `{}`.

use fpd_openrtb::{BidRequest, ExtRequestPrebid, FpdError};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::scope::Scope;

/// Key of the Prebid object inside the request extension.
const PREBID_KEY: &str = "prebid";

/// A decomposed scope extension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtFields {
    fields: Map<String, Value>,
    dirty: bool,
}

impl ExtFields {
    fn decompose(ext: Option<&Value>) -> Option<Self> {
        let fields = match ext {
            None => Map::new(),
            Some(Value::Object(fields)) => fields.clone(),
            Some(_) => return None,
        };
        Some(Self {
            fields,
            dirty: false,
        })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.dirty = true;
        self.fields.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.fields.remove(key);
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn recompose(&self) -> Option<Value> {
        if self.fields.is_empty() {
            None
        } else {
            Some(Value::Object(self.fields.clone()))
        }
    }
}

/// The decomposed request extension with a typed `prebid` view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestExt {
    prebid: Option<ExtRequestPrebid>,
    other: Map<String, Value>,
    dirty: bool,
}

impl RequestExt {
    fn decompose(ext: Option<&Value>) -> Result<Self, FpdError> {
        let mut other = match ext {
            None => Map::new(),
            Some(Value::Object(fields)) => fields.clone(),
            Some(_) => return Err(FpdError::request_extension("ext is not a JSON object")),
        };
        let prebid = match other.remove(PREBID_KEY) {
            None | Some(Value::Null) => None,
            Some(raw) => Some(
                serde_json::from_value::<ExtRequestPrebid>(raw)
                    .map_err(|e| FpdError::request_extension(format!("ext.prebid: {}", e)))?,
            ),
        };
        Ok(Self {
            prebid,
            other,
            dirty: false,
        })
    }

    pub fn prebid(&self) -> Option<&ExtRequestPrebid> {
        self.prebid.as_ref()
    }

    /// Replace `ext.prebid`; an empty prebid object is dropped.
    pub fn set_prebid(&mut self, prebid: Option<ExtRequestPrebid>) {
        self.prebid = prebid.filter(|p| !p.is_empty());
        self.dirty = true;
    }

    fn recompose(&self) -> Result<Option<Value>, FpdError> {
        let mut fields = self.other.clone();
        if let Some(prebid) = &self.prebid {
            let prebid = serde_json::to_value(prebid)
                .map_err(|e| FpdError::request_extension(format!("ext.prebid: {}", e)))?;
            fields.insert(PREBID_KEY.to_string(), prebid);
        }
        Ok(if fields.is_empty() {
            None
        } else {
            Some(Value::Object(fields))
        })
    }
}

/// Owns a bid request and its decomposed extensions.
#[derive(Debug, Clone, Default)]
pub struct RequestWrapper {
    request: BidRequest,
    site_ext: Option<ExtFields>,
    app_ext: Option<ExtFields>,
    user_ext: Option<ExtFields>,
    request_ext: Option<RequestExt>,
}

impl RequestWrapper {
    pub fn new(request: BidRequest) -> Self {
        Self {
            request,
            ..Default::default()
        }
    }

    /// Parse a wrapper from bid request JSON.
    pub fn from_json(json: &str) -> Result<Self, FpdError> {
        let request = BidRequest::from_json(json)
            .map_err(|e| FpdError::malformed_input(format!("failed to parse bid request: {}", e)))?;
        Ok(Self::new(request))
    }

    /// The wire request as of the last [`rebuild_request`](Self::rebuild_request).
    pub fn request(&self) -> &BidRequest {
        &self.request
    }

    /// Mutable access to the wire request.
    ///
    /// Clean decomposed extensions are discarded, so later access sees edits
    /// made here. Extensions with pending changes are kept and overwrite the
    /// same extension at the next rebuild.
    pub fn request_mut(&mut self) -> &mut BidRequest {
        for slot in [&mut self.site_ext, &mut self.app_ext, &mut self.user_ext] {
            if slot.as_ref().is_some_and(|ext| !ext.dirty) {
                *slot = None;
            }
        }
        if self.request_ext.as_ref().is_some_and(|ext| !ext.dirty) {
            self.request_ext = None;
        }
        &mut self.request
    }

    /// Recompose and hand back the wire request.
    pub fn into_request(mut self) -> Result<BidRequest, FpdError> {
        self.rebuild_request()?;
        Ok(self.request)
    }

    /// Decomposed extension of `scope`.
    ///
    /// `None` when the scope is absent or its extension is not a JSON object;
    /// such extensions are left exactly as they are.
    pub fn scope_ext_mut(&mut self, scope: Scope) -> Option<&mut ExtFields> {
        let (slot, ext) = match scope {
            Scope::Site => (&mut self.site_ext, self.request.site.as_ref().map(|s| s.ext.as_ref())),
            Scope::App => (&mut self.app_ext, self.request.app.as_ref().map(|a| a.ext.as_ref())),
            Scope::User => (&mut self.user_ext, self.request.user.as_ref().map(|u| u.ext.as_ref())),
        };
        if slot.is_none() {
            *slot = ExtFields::decompose(ext?);
        }
        slot.as_mut()
    }

    /// Decomposed request extension.
    pub fn request_ext_mut(&mut self) -> Result<&mut RequestExt, FpdError> {
        let ext = match self.request_ext.take() {
            Some(ext) => ext,
            None => RequestExt::decompose(self.request.ext.as_ref())?,
        };
        Ok(self.request_ext.insert(ext))
    }

    /// Write every changed decomposed extension back into the wire request.
    pub fn rebuild_request(&mut self) -> Result<(), FpdError> {
        if let Some(ext) = self.site_ext.as_mut().filter(|e| e.dirty) {
            if let Some(site) = self.request.site.as_mut() {
                site.ext = ext.recompose();
            }
            ext.dirty = false;
        }
        if let Some(ext) = self.app_ext.as_mut().filter(|e| e.dirty) {
            if let Some(app) = self.request.app.as_mut() {
                app.ext = ext.recompose();
            }
            ext.dirty = false;
        }
        if let Some(ext) = self.user_ext.as_mut().filter(|e| e.dirty) {
            if let Some(user) = self.request.user.as_mut() {
                user.ext = ext.recompose();
            }
            ext.dirty = false;
        }
        if let Some(ext) = self.request_ext.as_mut().filter(|e| e.dirty) {
            self.request.ext = ext.recompose()?;
            ext.dirty = false;
        }
        Ok(())
    }

    /// RFC 8785 canonical JSON of the wire request.
    pub fn canonical_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json_canonicalizer::to_vec(&self.request)
    }

    /// SHA-256 hex digest of [`canonical_json`](Self::canonical_json).
    pub fn canonical_digest(&self) -> Result<String, serde_json::Error> {
        let jcs_bytes = self.canonical_json()?;
        let mut hasher = Sha256::new();
        hasher.update(&jcs_bytes);
        Ok(hex::encode(hasher.finalize()))
    }
}
