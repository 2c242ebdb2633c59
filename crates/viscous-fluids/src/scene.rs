use crate::{
    bounds::Bounds2D,
    emitter::{Emitter, EmitterId, EmitterParams, EmitterSet},
    particle::ParticleInstance,
    viscoelastic::{ViscoelasticFluid, ViscoelasticParams},
    ConfigError,
    Fluid,
};

pub struct Scene<F, P> {
    /// The fluid for this scene.
    pub fluid: F,
    /// The parameters for this scene's fluid.
    params: P,
    /// The emitters feeding this scene's fluid.
    emitters: EmitterSet,
    /// Reused between frames by [`Scene::render`].
    instances: Vec<ParticleInstance>,
}

impl<F: Fluid<Params = P>, P> Scene<F, P> {
    #[inline(always)]
    pub fn new(fluid: F, params: P, emitters: EmitterSet) -> Self {
        Self {
            fluid,
            params,
            emitters,
            instances: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn params(&self) -> &P {
        &self.params
    }

    /// Adds an emitter to the scene, returning its ID.
    pub fn add_emitter(&mut self, params: EmitterParams) -> Result<EmitterId, ConfigError> {
        self.emitters.add(params)
    }

    /// Removes an emitter from the scene, given its ID.
    pub fn remove_emitter(&mut self, id: EmitterId) -> Option<Emitter> {
        self.emitters.remove(id)
    }

    pub fn emitter_mut(&mut self, id: EmitterId) -> Option<&mut Emitter> {
        self.emitters.get_mut(id)
    }

    #[inline(always)]
    pub fn emitters(&self) -> &EmitterSet {
        &self.emitters
    }

    /// Advances the scene by one fixed tick.
    pub fn step(&mut self, dt: f32) {
        self.fluid.step(
            dt,
            &self.params,
            &mut self.emitters,
        );
    }

    /// Snapshot of every live particle for presentation.
    pub fn render(&mut self) -> &[ParticleInstance] {
        self.fluid.write_instances(&mut self.instances);
        &self.instances
    }
}

impl Scene<ViscoelasticFluid, ViscoelasticParams> {
    /// Builds a viscoelastic scene over `bounds`, validating `params` up front.
    pub fn viscoelastic(
        bounds: Bounds2D,
        params: ViscoelasticParams,
        emitters: EmitterSet,
    ) -> Result<Self, ConfigError> {
        let fluid = ViscoelasticFluid::new(bounds, &params)?;
        Ok(Self::new(fluid, params, emitters))
    }
}
