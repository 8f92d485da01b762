use zinc_core::{DomainType, Graphics, GraphicsType, Region};

/// Minimal graphics for evaluating filters in unit tests.
pub(crate) struct TestGraphics {
    name: String,
    graphics_type: GraphicsType,
    domain_type: DomainType,
    visible: bool,
    scene_visible: bool,
    region: Region,
}

impl TestGraphics {
    pub(crate) fn new(name: &str, region: &Region) -> Self {
        Self {
            name: name.to_string(),
            graphics_type: GraphicsType::Lines,
            domain_type: DomainType::Mesh1d,
            visible: true,
            scene_visible: true,
            region: region.clone(),
        }
    }

    pub(crate) fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub(crate) fn scene_hidden(mut self) -> Self {
        self.scene_visible = false;
        self
    }

    pub(crate) fn with_type(mut self, graphics_type: GraphicsType) -> Self {
        self.graphics_type = graphics_type;
        self
    }

    pub(crate) fn with_domain(mut self, domain_type: DomainType) -> Self {
        self.domain_type = domain_type;
        self
    }
}

impl Graphics for TestGraphics {
    fn name(&self) -> &str {
        &self.name
    }

    fn graphics_type(&self) -> GraphicsType {
        self.graphics_type
    }

    fn domain_type(&self) -> DomainType {
        self.domain_type
    }

    fn visibility_flag(&self) -> bool {
        self.visible
    }

    fn region(&self) -> &Region {
        &self.region
    }

    fn scene_visibility_flag(&self) -> bool {
        self.scene_visible
    }
}
