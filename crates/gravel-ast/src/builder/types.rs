use gravel_core::Span;
use gravel_syntax::tree::{
    Annotation, ClassOrInterfaceType, ElementValue, ElementValues, Type, TypeArgument,
    TypeArguments, TypeKind, TypeParameters, WildcardBound,
};

use super::{AstBuilder, BResult};
use crate::ast::{AnnotationMember, AnnotationNode, ExprKind, Expression, GenericsType, TypeRef};

impl<'a> AstBuilder<'a> {
    /// A type in a position where `void` is not allowed.
    pub(super) fn ty(&mut self, ty: &Type) -> BResult<TypeRef> {
        self.type_ref(ty, false)
    }

    /// A method return type; `void` is allowed.
    pub(super) fn return_type(&mut self, ty: &Type) -> BResult<TypeRef> {
        self.type_ref(ty, true)
    }

    fn type_ref(&mut self, ty: &Type, allow_void: bool) -> BResult<TypeRef> {
        let kind_span = match &ty.kind {
            TypeKind::Primitive(ident) => ident.range,
            TypeKind::Void(span) => *span,
            TypeKind::Class(class) => class.range,
        };
        let element_span = Span::new(ty.range.start, kind_span.end);
        let element_range = self.range(element_span)?;
        let mut element = match &ty.kind {
            TypeKind::Primitive(ident) => TypeRef::named(ident.text.as_str(), element_range),
            TypeKind::Void(span) => {
                if !ty.dims.is_empty() {
                    return self.fail("void[] is an invalid type", ty.range);
                }
                if !allow_void {
                    return self.fail("void is not allowed here", *span);
                }
                TypeRef::named("void", element_range)
            }
            TypeKind::Class(class) => self.class_type(class)?,
        };
        element.range = element_range;
        element.annotations = self.annotations(&ty.annotations)?;

        let mut result = element;
        for dim in &ty.dims {
            let range = self.range(Span::new(ty.range.start, dim.range.end))?;
            let mut array = TypeRef::array_of(result, range);
            array.annotations = self.annotations(&dim.annotations)?;
            result = array;
        }
        Ok(result)
    }

    pub(super) fn class_type(&mut self, class: &ClassOrInterfaceType) -> BResult<TypeRef> {
        let mut ty = TypeRef::named(class.name.text(), self.range(class.range)?);
        if let Some(args) = &class.type_args {
            ty.generics = self.type_arguments(args)?;
        }
        Ok(ty)
    }

    pub(super) fn type_arguments(&mut self, args: &TypeArguments) -> BResult<Vec<GenericsType>> {
        args.args
            .iter()
            .map(|arg| self.type_argument(arg))
            .collect()
    }

    fn type_argument(&mut self, arg: &TypeArgument) -> BResult<GenericsType> {
        match arg {
            TypeArgument::Type(ty) => {
                let ty = self.ty(ty)?;
                Ok(GenericsType {
                    name: ty.name.as_str().into(),
                    range: ty.range,
                    ty,
                    upper_bounds: Vec::new(),
                    lower_bound: None,
                    wildcard: false,
                    placeholder: false,
                })
            }
            TypeArgument::Wildcard {
                annotations,
                bound,
                range,
            } => {
                let range = self.range(*range)?;
                let mut base = TypeRef::named("?", range);
                base.annotations = self.annotations(annotations)?;
                let (upper_bounds, lower_bound) = match bound {
                    Some((WildcardBound::Extends, ty)) => (vec![self.ty(ty)?], None),
                    Some((WildcardBound::Super, ty)) => (Vec::new(), Some(self.ty(ty)?)),
                    None => (Vec::new(), None),
                };
                Ok(GenericsType {
                    name: "?".into(),
                    ty: base,
                    upper_bounds,
                    lower_bound,
                    wildcard: true,
                    placeholder: false,
                    range,
                })
            }
        }
    }

    pub(super) fn type_parameters(
        &mut self,
        params: Option<&TypeParameters>,
    ) -> BResult<Vec<GenericsType>> {
        let Some(params) = params else {
            return Ok(Vec::new());
        };
        let mut out = Vec::with_capacity(params.params.len());
        for param in &params.params {
            let mut ty = TypeRef::named(param.name.text.as_str(), self.range(param.name.range)?);
            ty.annotations = self.annotations(&param.annotations)?;
            let upper_bounds = param
                .bounds
                .iter()
                .map(|bound| self.ty(bound))
                .collect::<BResult<Vec<_>>>()?;
            out.push(GenericsType {
                name: param.name.text.clone(),
                ty,
                upper_bounds,
                lower_bound: None,
                wildcard: false,
                placeholder: true,
                range: self.range(param.range)?,
            });
        }
        Ok(out)
    }

    pub(super) fn annotations(&mut self, annotations: &[Annotation]) -> BResult<Vec<AnnotationNode>> {
        annotations
            .iter()
            .map(|annotation| self.annotation(annotation))
            .collect()
    }

    pub(super) fn annotation(&mut self, annotation: &Annotation) -> BResult<AnnotationNode> {
        let class_name = TypeRef::named(annotation.name.text(), self.range(annotation.name.range)?);
        let members = match &annotation.values {
            None => Vec::new(),
            Some(ElementValues::Single(value)) => vec![AnnotationMember {
                name: "value".into(),
                value: self.element_value(value)?,
            }],
            Some(ElementValues::Pairs(pairs)) => pairs
                .iter()
                .map(|pair| {
                    Ok(AnnotationMember {
                        name: pair.name.text.clone(),
                        value: self.element_value(&pair.value)?,
                    })
                })
                .collect::<BResult<Vec<_>>>()?,
        };
        Ok(AnnotationNode {
            class_name,
            members,
            range: self.range(annotation.range)?,
        })
    }

    pub(super) fn element_value(&mut self, value: &ElementValue) -> BResult<Expression> {
        match value {
            ElementValue::Expr(expr) => self.expr(expr),
            ElementValue::Annotation(annotation) => {
                let range = self.range(annotation.range)?;
                let annotation = self.annotation(annotation)?;
                Ok(Expression::new(ExprKind::AnnotationConstant { annotation }, range))
            }
            ElementValue::Array { values, range } => {
                let elements = values
                    .iter()
                    .map(|value| self.element_value(value))
                    .collect::<BResult<Vec<_>>>()?;
                Ok(Expression::new(
                    ExprKind::List {
                        elements,
                        wrapped: false,
                    },
                    self.range(*range)?,
                ))
            }
        }
    }
}
