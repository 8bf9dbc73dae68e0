//! Static function builder — namespace-scope functions attached to a class
//! (factory-style free functions), emitted as `static` members with the
//! same camelCase and callback-filtering rules as instance methods.

use crate::context::GenerationContext;
use crate::mapper::TypeMapper;
use crate::model::Function;
use crate::writers::body::MethodStructure;

use super::methods::{MethodBuilder, function_as_method};

pub struct StaticFunctionBuilder<'a> {
    mapper: &'a TypeMapper<'a>,
}

impl<'a> StaticFunctionBuilder<'a> {
    pub fn new(mapper: &'a TypeMapper<'a>) -> Self {
        StaticFunctionBuilder { mapper }
    }

    /// Mirror of [`MethodBuilder::build_structures`] for namespace-scope
    /// functions, producing `is_static` structures.
    pub fn build_structures(
        &self,
        functions: &[Function],
        ctx: &mut GenerationContext,
    ) -> Vec<MethodStructure> {
        let as_methods: Vec<_> = functions.iter().map(function_as_method).collect();
        MethodBuilder::new(self.mapper).build_structures(&as_methods, true, ctx)
    }
}
