use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::api::network_dto::LinkDto;
use crate::domain::optical_model::network::connect_point::ConnectPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkState {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkType {
    #[default]
    Optical,
    Direct,
    Indirect,
}

/// A directed edge between two connect points.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    pub src: ConnectPoint,
    pub dst: ConnectPoint,
    pub link_type: LinkType,
    pub state: LinkState,
    pub annotations: BTreeMap<String, String>,
}

impl Link {
    pub fn new(src: ConnectPoint, dst: ConnectPoint) -> Self {
        Self { src, dst, link_type: LinkType::Optical, state: LinkState::Active, annotations: BTreeMap::new() }
    }

    /// Builds the link and, for bidirectional entries, its mirror.
    pub fn from_dto(dto: LinkDto) -> Vec<Link> {
        let link = Link { src: dto.src, dst: dto.dst, link_type: dto.link_type, state: dto.state, annotations: dto.annotations };
        if dto.bidirectional {
            let mirror = link.reversed();
            vec![link, mirror]
        } else {
            vec![link]
        }
    }

    pub fn to_dto(&self) -> LinkDto {
        LinkDto {
            src: self.src.clone(),
            dst: self.dst.clone(),
            link_type: self.link_type,
            state: self.state,
            annotations: self.annotations.clone(),
            bidirectional: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state == LinkState::Active
    }

    /// The same link seen from the other end, annotations preserved.
    pub fn reversed(&self) -> Link {
        Link {
            src: self.dst.clone(),
            dst: self.src.clone(),
            link_type: self.link_type,
            state: self.state,
            annotations: self.annotations.clone(),
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.src, self.dst)
    }
}
