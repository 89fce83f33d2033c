use crate::model::{
    AssemblyModel, FieldDef, FieldRef, Instruction, LocalVar, MemberName, MemberRef, MethodBody,
    MethodDef, MethodRef, PropertyDef, TypeDef, TypeName, TypeRef,
};
use crate::policy::{PolicySet, RestrictionDef, RestrictionKind};
use crate::resolve::AssemblySet;

pub fn ty(assembly: &str, namespace: &str, name: &str) -> TypeRef {
    TypeRef::new(assembly, namespace, name)
}

pub fn object_root() -> TypeRef {
    ty("mscorlib", "System", "Object")
}

pub fn type_def(reference: &TypeRef, base: Option<TypeRef>, methods: Vec<MethodDef>) -> TypeDef {
    TypeDef {
        namespace: reference.namespace.clone(),
        name: reference.name.clone(),
        base_type: base,
        fields: Vec::new(),
        properties: Vec::new(),
        methods,
    }
}

pub fn assembly(name: &str, types: Vec<TypeDef>) -> AssemblyModel {
    AssemblyModel::new(name, types)
}

/// Method with a body and an empty parameter list.
pub fn method_def(name: &str, instructions: Vec<Instruction>) -> MethodDef {
    method_def_sig(name, "()", instructions)
}

pub fn method_def_sig(name: &str, signature: &str, instructions: Vec<Instruction>) -> MethodDef {
    MethodDef {
        name: name.to_string(),
        signature: signature.to_string(),
        body: Some(MethodBody {
            locals: Vec::new(),
            instructions,
        }),
    }
}

pub fn abstract_method(name: &str) -> MethodDef {
    MethodDef {
        name: name.to_string(),
        signature: "()".to_string(),
        body: None,
    }
}

pub fn method_ref(owner: &TypeRef, name: &str) -> MethodRef {
    method_ref_sig(owner, name, "()")
}

pub fn method_ref_sig(owner: &TypeRef, name: &str, signature: &str) -> MethodRef {
    MethodRef {
        declaring_type: owner.clone(),
        name: name.to_string(),
        signature: signature.to_string(),
    }
}

pub fn call(method: &MethodRef) -> Instruction {
    Instruction {
        offset: 0,
        opcode: "call".to_string(),
        operand: Some(MemberRef::Method(method.clone())),
    }
}

pub fn load_field(owner: &TypeRef, name: &str, field_type: TypeRef) -> Instruction {
    Instruction {
        offset: 0,
        opcode: "ldfld".to_string(),
        operand: Some(MemberRef::Field(FieldRef {
            declaring_type: owner.clone(),
            name: name.to_string(),
            field_type,
        })),
    }
}

pub fn local(index: u32, var_type: TypeRef) -> LocalVar {
    LocalVar { index, var_type }
}

pub fn field(name: &str, field_type: TypeRef) -> FieldDef {
    FieldDef {
        name: name.to_string(),
        field_type,
    }
}

pub fn property(name: &str, property_type: TypeRef) -> PropertyDef {
    PropertyDef {
        name: name.to_string(),
        property_type,
    }
}

pub fn unity(name: &str) -> TypeRef {
    ty("UnityEngine", "UnityEngine", name)
}

pub fn mod_behaviour() -> TypeRef {
    ty("ModTool.Interface", "ModTool.Interface", "ModBehaviour")
}

/// `UnityEngine` and `ModTool.Interface` reference assemblies with the usual hierarchy:
/// `ModBehaviour : MonoBehaviour : Behaviour : Component : Object`, `GameObject : Object`.
pub fn engine_assemblies() -> AssemblySet {
    let object = unity("Object");
    let instantiate = method_def_sig("Instantiate", "(UnityEngine.Object)", vec![]);
    let unity_engine = assembly(
        "UnityEngine",
        vec![
            type_def(&object, Some(object_root()), vec![instantiate]),
            type_def(&unity("Component"), Some(object.clone()), vec![]),
            type_def(&unity("Behaviour"), Some(unity("Component")), vec![]),
            type_def(&unity("MonoBehaviour"), Some(unity("Behaviour")), vec![]),
            type_def(
                &unity("GameObject"),
                Some(object.clone()),
                vec![
                    method_def_sig("AddComponent", "(System.Type)", vec![]),
                    method_def(".ctor", vec![]),
                ],
            ),
        ],
    );

    let wrapper = method_def_sig(
        "Instantiate",
        "(UnityEngine.Object)",
        vec![call(&method_ref_sig(
            &object,
            "Instantiate",
            "(UnityEngine.Object)",
        ))],
    );
    let interface = assembly(
        "ModTool.Interface",
        vec![type_def(
            &mod_behaviour(),
            Some(unity("MonoBehaviour")),
            vec![wrapper],
        )],
    );

    [unity_engine, interface].into_iter().collect()
}

pub fn policy(restrictions: Vec<RestrictionDef>) -> PolicySet {
    PolicySet {
        profile: "test".to_string(),
        restrictions,
        ..PolicySet::default()
    }
}

pub fn prohibit_member(declaring: &str, member: &str, message: &str) -> RestrictionDef {
    RestrictionDef::prohibited(
        RestrictionKind::Member {
            target: MemberName::new(TypeName::parse_dotted(declaring), member),
        },
        message,
    )
}

/// The stock mod-hosting policy.
pub fn modtool_policy() -> PolicySet {
    PolicySet {
        profile: "modtool".to_string(),
        restrictions: vec![
            prohibit_member(
                "UnityEngine.Object",
                "Instantiate",
                "Please use ModBehaviour.Instantiate or ContentHandler.Instantiate instead to ensure proper object creation.",
            ),
            prohibit_member(
                "UnityEngine.GameObject",
                "AddComponent",
                "Please use ModBehaviour.AddComponent or ContentHandler.AddComponent instead to ensure proper component handling.",
            ),
            prohibit_member(
                "UnityEngine.GameObject",
                ".ctor",
                "Creating new GameObjects is not allowed",
            ),
            RestrictionDef::required(
                RestrictionKind::Inheritance {
                    base: TypeName::new("ModTool.Interface", "ModBehaviour"),
                },
                "Please use ModTool.Interface.ModBehaviour instead of MonoBehaviour.",
            )
            .applicable_to(TypeName::new("UnityEngine", "MonoBehaviour")),
        ],
        ..PolicySet::default()
    }
}
