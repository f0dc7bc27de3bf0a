use std::collections::HashSet;

use crate::chain::types::ChainRequest;

/// 把 `from` 位置的步骤移动到 `to`，并修剪失效的依赖
///
/// 越界时不做任何修改并返回 `false`。
pub fn reorder(definitions: &mut Vec<ChainRequest>, from: usize, to: usize) -> bool {
    if from >= definitions.len() || to >= definitions.len() {
        return false;
    }

    if from != to {
        let moved = definitions.remove(from);
        definitions.insert(to, moved);
    }

    prune_dependencies(definitions);
    true
}

/// 每个步骤只能依赖排在它前面的步骤，其余依赖被删除
pub fn prune_dependencies(definitions: &mut [ChainRequest]) {
    let mut earlier: HashSet<String> = HashSet::new();

    for def in definitions.iter_mut() {
        def.depends_on.retain(|dep| earlier.contains(dep));
        earlier.insert(def.id.clone());
    }
}
