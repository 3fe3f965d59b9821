use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use tracing::debug;

use crate::{
    cond::{CondKind, CondRef, WalkOrder},
    error::IrError,
    function::EventFunction,
    intermediate::{Body, Goto, GotoTarget, Intermediate, IntermediateKind, label_id},
};

const SKIP_LABEL: &str = "skip";
const NODE_LABEL: &str = "label";

/// Resolves every internal jump of the function to a label target.
pub fn resolve_jumps(func: &mut EventFunction) -> Result<(), IrError> {
    label_internal_gotos(func)?;
    label_skip_lines(func)
}

/// Rewrites gotos that target a node index into gotos to a label attached to
/// that node.
///
/// Every target is checked before anything is rewritten, so the function is
/// left untouched on error.
pub fn label_internal_gotos(func: &mut EventFunction) -> Result<(), IrError> {
    let mut targets = Vec::new();
    let mut ids = FxHashSet::default();
    func.walk(&mut |im| {
        ids.extend(im.id);
        if let IntermediateKind::Goto(Goto {
            target: GotoTarget::Node(node),
            ..
        }) = &im.kind
        {
            targets.push(*node);
        }
    });

    if let Some(node) = targets.iter().find(|node| !ids.contains(*node)) {
        return Err(IrError::UnresolvedNode { node: *node });
    }
    if targets.is_empty() {
        return Ok(());
    }

    let targets: FxHashSet<usize> = targets.into_iter().collect();
    let mut used = used_labels(func);
    let mut names: FxHashMap<usize, SmolStr> = FxHashMap::default();
    func.rewrite(&mut |im| {
        if let Some(id) = im.id.filter(|id| targets.contains(id) && !names.contains_key(id)) {
            let name = attach_label(im, NODE_LABEL, &mut used);
            names.insert(id, name);
        }
        None
    });

    func.rewrite(&mut |im| {
        if let IntermediateKind::Goto(goto) = &mut im.kind
            && let GotoTarget::Node(node) = goto.target
            && let Some(name) = names.get(&node)
        {
            goto.target = GotoTarget::Label(name.clone());
        }
        None
    });

    debug!(event = %func.id, labels = names.len(), "labeled internal gotos");
    Ok(())
}

/// Rewrites raw `SkipLines` gotos into label targets.
///
/// The target is found by counting instruction-emitting statements in the same
/// body. A skip landing exactly at the end of a body gets a `NoOp` appended to
/// carry its label. Every skip is checked before anything is rewritten, so the
/// function is left untouched on error.
pub fn label_skip_lines(func: &mut EventFunction) -> Result<(), IrError> {
    check_skips(&func.body)?;

    let mut used = used_labels(func);
    let before = used.len();

    label_skips_in_body(&mut func.body, &mut used)?;

    debug!(event = %func.id, labels = used.len() - before, "labeled skips");
    Ok(())
}

fn check_skips(body: &[Intermediate]) -> Result<(), IrError> {
    for (pos, im) in body.iter().enumerate() {
        for nested in im.bodies() {
            check_skips(nested)?;
        }
        if let IntermediateKind::Goto(Goto {
            target: GotoTarget::SkipLines(lines),
            ..
        }) = &im.kind
        {
            skip_target(body, pos, *lines)?;
        }
    }
    Ok(())
}

fn label_skips_in_body(body: &mut Body, used: &mut FxHashSet<SmolStr>) -> Result<(), IrError> {
    for im in body.iter_mut() {
        for nested in im.bodies_mut() {
            label_skips_in_body(nested, used)?;
        }
    }

    for pos in 0..body.len() {
        let lines = match &body[pos].kind {
            IntermediateKind::Goto(Goto {
                target: GotoTarget::SkipLines(lines),
                ..
            }) => *lines,
            _ => continue,
        };

        let target = skip_target(body, pos, lines)?;
        if target == body.len() {
            body.push(Intermediate::noop());
        }

        let name = attach_label(&mut body[target], SKIP_LABEL, used);
        if let IntermediateKind::Goto(goto) = &mut body[pos].kind {
            goto.target = GotoTarget::Label(name);
        }
    }

    Ok(())
}

fn skip_target(body: &[Intermediate], from: usize, lines: u32) -> Result<usize, IrError> {
    let mut remaining = lines;
    let mut pos = from + 1;

    while remaining > 0 {
        let im = body.get(pos).ok_or(IrError::UnresolvedSkip {
            lines,
            reason: "runs past the end of the body",
        })?;
        if !im.bodies().is_empty() {
            return Err(IrError::UnresolvedSkip {
                lines,
                reason: "crosses a nested block",
            });
        }
        if im.is_instruction() {
            remaining -= 1;
        }
        pos += 1;
    }

    Ok(pos)
}

/// Returns the node's first synthetic label, attaching a fresh one if it has none.
fn attach_label(im: &mut Intermediate, fallback: &str, used: &mut FxHashSet<SmolStr>) -> SmolStr {
    if let Some(label) = im.labels.first() {
        return label.clone();
    }

    let base = im.label_hint.clone().unwrap_or_else(|| SmolStr::new(fallback));
    let name = unique_label(&base, used);
    im.labels.push(name.clone());
    name
}

fn unique_label(base: &str, used: &mut FxHashSet<SmolStr>) -> SmolStr {
    let name = if used.contains(base) || label_id(base).is_some() {
        (1..)
            .map(|n| SmolStr::new(format!("{}{}", base, n)))
            .find(|candidate| !used.contains(candidate) && label_id(candidate).is_none())
            .unwrap_or_else(|| SmolStr::new(base))
    } else {
        SmolStr::new(base)
    };

    used.insert(name.clone());
    name
}

/// Every label name declared or referenced in the function.
fn used_labels(func: &EventFunction) -> FxHashSet<SmolStr> {
    let mut used = FxHashSet::default();
    func.walk(&mut |im| {
        used.extend(im.labels.iter().cloned());
        match &im.kind {
            IntermediateKind::Label(label) => {
                used.insert(label.name());
            }
            IntermediateKind::FillSkip(fill) => {
                used.insert(fill.label.clone());
            }
            IntermediateKind::Goto(goto) => {
                used.extend(goto.label().cloned());
            }
            _ => {}
        }
    });
    used
}

/// Checks that every jump targets a declared label and every named condition
/// variable is assigned somewhere in the function.
///
/// Reports the first problem in walk order.
pub fn verify_references(func: &EventFunction) -> Result<(), IrError> {
    let mut declared = FxHashSet::default();
    let mut assigned = FxHashSet::default();
    func.walk(&mut |im| {
        declared.extend(im.labels.iter().cloned());
        match &im.kind {
            IntermediateKind::Label(label) => {
                declared.insert(label.name());
            }
            IntermediateKind::FillSkip(fill) => {
                declared.insert(fill.label.clone());
            }
            IntermediateKind::CondAssign(assign) => {
                assigned.extend(assign.to_var.clone());
            }
            _ => {}
        }
    });

    let mut first_error: Option<IrError> = None;
    func.walk(&mut |im| {
        if first_error.is_some() {
            return;
        }

        if let IntermediateKind::Goto(goto) = &im.kind {
            match &goto.target {
                GotoTarget::Label(label) if !declared.contains(label) => {
                    first_error = Some(IrError::UnresolvedLabel {
                        label: label.clone(),
                    });
                    return;
                }
                GotoTarget::Label(_) => {}
                GotoTarget::Node(_) | GotoTarget::SkipLines(_) => {
                    first_error = Some(IrError::TransientGoto {
                        statement: im.to_string(),
                    });
                    return;
                }
            }
        }

        if let Some(cond) = im.cond() {
            cond.walk(
                &mut |cond| {
                    if let CondKind::Ref(CondRef {
                        name: Some(name), ..
                    }) = &cond.kind
                        && first_error.is_none()
                        && !assigned.contains(name)
                    {
                        first_error = Some(IrError::UnresolvedCondition { name: name.clone() });
                    }
                },
                WalkOrder::PreOrder,
            );
        }
    });

    debug!(
        event = %func.id,
        labels = declared.len(),
        ok = first_error.is_none(),
        "verified references"
    );

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
