//! E-shelf request builders.
//!
//! Each request is a plain struct serialised to an XML body with quick-xml's
//! serde support. Responses are returned raw by
//! [`HttpWebService::send_eshelf`](super::HttpWebService::send_eshelf).

use serde::Serialize;

use super::ServiceError;

/// Fetch the folder structure of a user's e-shelf
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename = "getEshelfStructureRequest", rename_all = "camelCase")]
pub struct GetEshelfStructure {
    pub user_id: String,
    pub institution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    pub include_basket_items: bool,
}

impl GetEshelfStructure {
    pub fn new(user_id: impl Into<String>, institution: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            institution: institution.into(),
            folder_id: None,
            include_basket_items: false,
        }
    }

    pub fn folder_id(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }

    pub fn include_basket_items(mut self, include: bool) -> Self {
        self.include_basket_items = include;
        self
    }
}

/// Fetch the contents of a user's e-shelf
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename = "getEshelfRequest", rename_all = "camelCase")]
pub struct GetEshelf {
    pub user_id: String,
    pub institution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    pub get_delivery: bool,
}

impl GetEshelf {
    pub fn new(user_id: impl Into<String>, institution: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            institution: institution.into(),
            folder_id: None,
            get_delivery: false,
        }
    }

    pub fn folder_id(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }

    pub fn get_delivery(mut self, get_delivery: bool) -> Self {
        self.get_delivery = get_delivery;
        self
    }
}

/// Add a record to a user's e-shelf
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename = "addToEshelfRequest", rename_all = "camelCase")]
pub struct AddToEshelf {
    pub user_id: String,
    pub institution: String,
    pub doc_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub searchkey: Option<String>,
}

impl AddToEshelf {
    pub fn new(
        user_id: impl Into<String>,
        institution: impl Into<String>,
        doc_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            institution: institution.into(),
            doc_id: doc_id.into(),
            searchkey: None,
        }
    }

    pub fn searchkey(mut self, searchkey: impl Into<String>) -> Self {
        self.searchkey = Some(searchkey.into());
        self
    }
}

/// Remove a record from a user's e-shelf
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename = "removeFromEshelfRequest", rename_all = "camelCase")]
pub struct RemoveFromEshelf {
    pub user_id: String,
    pub institution: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_id: Option<String>,
    pub doc_id: String,
}

impl RemoveFromEshelf {
    pub fn new(
        user_id: impl Into<String>,
        institution: impl Into<String>,
        doc_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            institution: institution.into(),
            folder_id: None,
            doc_id: doc_id.into(),
        }
    }

    pub fn folder_id(mut self, folder_id: impl Into<String>) -> Self {
        self.folder_id = Some(folder_id.into());
        self
    }
}

/// Create a folder in a user's e-shelf
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename = "addFolderToEshelfRequest", rename_all = "camelCase")]
pub struct AddFolderToEshelf {
    pub user_id: String,
    pub institution: String,
    pub folder_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_folder: Option<String>,
}

impl AddFolderToEshelf {
    pub fn new(
        user_id: impl Into<String>,
        institution: impl Into<String>,
        folder_name: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            institution: institution.into(),
            folder_name: folder_name.into(),
            parent_folder: None,
        }
    }

    pub fn parent_folder(mut self, parent_folder: impl Into<String>) -> Self {
        self.parent_folder = Some(parent_folder.into());
        self
    }
}

/// Delete a folder from a user's e-shelf
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename = "removeFolderFromEshelfRequest", rename_all = "camelCase")]
pub struct RemoveFolderFromEshelf {
    pub user_id: String,
    pub institution: String,
    pub folder_id: String,
}

impl RemoveFolderFromEshelf {
    pub fn new(
        user_id: impl Into<String>,
        institution: impl Into<String>,
        folder_id: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            institution: institution.into(),
            folder_id: folder_id.into(),
        }
    }
}

/// Any e-shelf request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EshelfRequest {
    GetEshelfStructure(GetEshelfStructure),
    GetEshelf(GetEshelf),
    AddToEshelf(AddToEshelf),
    RemoveFromEshelf(RemoveFromEshelf),
    AddFolderToEshelf(AddFolderToEshelf),
    RemoveFolderFromEshelf(RemoveFolderFromEshelf),
}

impl EshelfRequest {
    /// Web-service operation name
    pub fn operation(&self) -> &'static str {
        match self {
            EshelfRequest::GetEshelfStructure(_) => "getEshelfStructure",
            EshelfRequest::GetEshelf(_) => "getEshelf",
            EshelfRequest::AddToEshelf(_) => "addToEshelf",
            EshelfRequest::RemoveFromEshelf(_) => "removeFromEshelf",
            EshelfRequest::AddFolderToEshelf(_) => "addFolderToEshelf",
            EshelfRequest::RemoveFolderFromEshelf(_) => "removeFolderFromEshelf",
        }
    }

    /// Serialise the request body
    pub fn to_xml(&self) -> Result<String, ServiceError> {
        let xml = match self {
            EshelfRequest::GetEshelfStructure(r) => quick_xml::se::to_string(r),
            EshelfRequest::GetEshelf(r) => quick_xml::se::to_string(r),
            EshelfRequest::AddToEshelf(r) => quick_xml::se::to_string(r),
            EshelfRequest::RemoveFromEshelf(r) => quick_xml::se::to_string(r),
            EshelfRequest::AddFolderToEshelf(r) => quick_xml::se::to_string(r),
            EshelfRequest::RemoveFolderFromEshelf(r) => quick_xml::se::to_string(r),
        };
        xml.map_err(|e| ServiceError::InvalidRequest(format!("e-shelf request: {}", e)))
    }
}

macro_rules! impl_from_request {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for EshelfRequest {
                fn from(request: $variant) -> Self {
                    EshelfRequest::$variant(request)
                }
            }
        )*
    };
}

impl_from_request!(
    GetEshelfStructure,
    GetEshelf,
    AddToEshelf,
    RemoveFromEshelf,
    AddFolderToEshelf,
    RemoveFolderFromEshelf
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_eshelf_xml() {
        let request: EshelfRequest = GetEshelf::new("N12345", "NYU")
            .folder_id("100")
            .get_delivery(true)
            .into();
        assert_eq!(request.operation(), "getEshelf");
        assert_eq!(
            request.to_xml().unwrap(),
            "<getEshelfRequest><userId>N12345</userId><institution>NYU</institution>\
             <folderId>100</folderId><getDelivery>true</getDelivery></getEshelfRequest>"
        );
    }

    #[test]
    fn test_optional_elements_are_omitted() {
        let request: EshelfRequest = AddToEshelf::new("N12345", "NYU", "nyu_aleph000062856").into();
        let xml = request.to_xml().unwrap();
        assert!(xml.starts_with("<addToEshelfRequest>"));
        assert!(xml.contains("<docId>nyu_aleph000062856</docId>"));
        assert!(!xml.contains("searchkey"));
        assert!(!xml.contains("folderId"));
    }

    #[test]
    fn test_folder_requests() {
        let add: EshelfRequest = AddFolderToEshelf::new("N12345", "NYU", "Reading & notes")
            .parent_folder("1")
            .into();
        let xml = add.to_xml().unwrap();
        assert!(xml.contains("<folderName>Reading &amp; notes</folderName>"));
        assert!(xml.contains("<parentFolder>1</parentFolder>"));

        let remove: EshelfRequest = RemoveFolderFromEshelf::new("N12345", "NYU", "7").into();
        assert_eq!(remove.operation(), "removeFolderFromEshelf");
        assert!(remove.to_xml().unwrap().contains("<folderId>7</folderId>"));
    }

    #[test]
    fn test_structure_and_remove_requests() {
        let structure: EshelfRequest = GetEshelfStructure::new("N12345", "NYU")
            .include_basket_items(true)
            .into();
        assert!(structure
            .to_xml()
            .unwrap()
            .contains("<includeBasketItems>true</includeBasketItems>"));

        let remove: EshelfRequest = RemoveFromEshelf::new("N12345", "NYU", "doc1")
            .folder_id("3")
            .into();
        let xml = remove.to_xml().unwrap();
        assert!(xml.contains("<folderId>3</folderId><docId>doc1</docId>"));
    }
}
